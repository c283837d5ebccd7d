use blockbridge_network_common::{Era, ProtocolVersion};

pub const PLAYER_EYE_HEIGHT: f64 = 1.62;

/// Which height a position packet carries in its Y field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YConvention {
    Eye,
    Feet,
}

impl YConvention {
    pub fn of(version: ProtocolVersion) -> Self {
        match version.era() {
            Era::Bedrock => YConvention::Eye,
            _ if version.is_at_least(ProtocolVersion::Modern1_8) => YConvention::Feet,
            _ => YConvention::Eye,
        }
    }

    pub fn to_wire(self, feet_y: f64) -> f64 {
        match self {
            YConvention::Eye => feet_y + PLAYER_EYE_HEIGHT,
            YConvention::Feet => feet_y,
        }
    }

    pub fn from_wire(self, wire_y: f64) -> f64 {
        match self {
            YConvention::Eye => wire_y - PLAYER_EYE_HEIGHT,
            YConvention::Feet => wire_y,
        }
    }
}

/// Entity positions travel as 1/32 block fixed point.
pub fn to_fixed_point(value: f64) -> i32 {
    (value * 32.0).floor() as i32
}

pub fn from_fixed_point(value: i32) -> f64 {
    value as f64 / 32.0
}

/// Degrees to a 1/256 turn byte.
pub fn to_angle_byte(degrees: f32) -> i8 {
    ((degrees.rem_euclid(360.0) / 360.0 * 256.0) as u32 & 0xff) as u8 as i8
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn conventions_by_version() {
        assert_eq!(YConvention::of(ProtocolVersion::Alpha1_2_6), YConvention::Eye);
        assert_eq!(YConvention::of(ProtocolVersion::Modern1_7_6), YConvention::Eye);
        assert_eq!(YConvention::of(ProtocolVersion::Modern1_8), YConvention::Feet);
        assert_eq!(YConvention::of(ProtocolVersion::Bedrock1_20_0), YConvention::Eye);
    }

    #[test]
    fn angles_wrap() {
        assert_eq!(to_angle_byte(0.0), 0);
        assert_eq!(to_angle_byte(90.0), 64);
        assert_eq!(to_angle_byte(180.0), -128);
        assert_eq!(to_angle_byte(-90.0), -64);
        assert_eq!(to_angle_byte(360.0), 0);
    }

    #[test]
    fn fixed_point_floors() {
        assert_eq!(to_fixed_point(1.0), 32);
        assert_eq!(to_fixed_point(-0.01), -1);
        assert_eq!(from_fixed_point(-48), -1.5);
    }

    proptest! {
        #[test]
        fn wire_y_round_trips(feet_y in -64.0f64..320.0, index in 0usize..ProtocolVersion::ALL.len()) {
            let convention = YConvention::of(ProtocolVersion::ALL[index]);
            let back = convention.from_wire(convention.to_wire(feet_y));
            prop_assert!((back - feet_y).abs() < 1e-9);
        }
    }
}
