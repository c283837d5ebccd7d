use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Era {
    Alpha,
    Beta,
    Release,
    Modern,
    Bedrock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    Java,
    Bedrock,
}

/// How strings are laid out on the wire for a given era.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// u16 byte length followed by Java modified UTF-8.
    ModifiedUtf8,
    /// i16 code unit count followed by big endian UTF-16.
    Utf16,
    /// varint byte length followed by UTF-8.
    VarIntUtf8,
}

/// The shape of the first bytes a client sent, used together with the
/// numeric protocol version to find a catalog entry. Numbers are reused
/// between flavors so neither is sufficient alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireFlavor {
    LegacyModifiedUtf8,
    LegacyString16,
    LegacyVersioned,
    Modern,
    Bedrock,
}

macro_rules! protocol_versions {
    ($($variant:ident => ($name:literal, $number:literal, $era:ident)),* $(,)?) => {
        /// Every supported client version, declared in historical release
        /// order so the derived `Ord` matches "is at least".
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ProtocolVersion {
            $($variant),*
        }

        impl ProtocolVersion {
            pub const ALL: &'static [ProtocolVersion] = &[$(ProtocolVersion::$variant),*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(ProtocolVersion::$variant => $name),*
                }
            }

            pub const fn wire_number(self) -> i32 {
                match self {
                    $(ProtocolVersion::$variant => $number),*
                }
            }

            pub const fn era(self) -> Era {
                match self {
                    $(ProtocolVersion::$variant => Era::$era),*
                }
            }
        }
    };
}

protocol_versions! {
    Alpha1_0_17 => ("a1.0.17", 14, Alpha),
    Alpha1_1_2 => ("a1.1.2", 2, Alpha),
    Alpha1_2_6 => ("a1.2.6", 6, Alpha),
    Beta1_0 => ("b1.0", 7, Alpha),
    Beta1_1 => ("b1.1", 8, Alpha),
    Beta1_3 => ("b1.3", 9, Alpha),
    Beta1_4 => ("b1.4", 10, Alpha),
    Beta1_5 => ("b1.5", 11, Beta),
    Beta1_6 => ("b1.6", 13, Beta),
    Beta1_7 => ("b1.7", 14, Beta),
    Beta1_8 => ("b1.8", 17, Beta),
    Release1_0 => ("1.0", 22, Beta),
    Release1_1 => ("1.1", 23, Beta),
    Release1_2_1 => ("1.2.1", 28, Beta),
    Release1_2_4 => ("1.2.4", 29, Beta),
    Release1_3_1 => ("1.3.1", 39, Release),
    Release1_4_2 => ("1.4.2", 47, Release),
    Release1_4_4 => ("1.4.4", 49, Release),
    Release1_4_6 => ("1.4.6", 51, Release),
    Release1_5_1 => ("1.5.1", 60, Release),
    Release1_5_2 => ("1.5.2", 61, Release),
    Release1_6_1 => ("1.6.1", 73, Release),
    Release1_6_2 => ("1.6.2", 74, Release),
    Release1_6_4 => ("1.6.4", 78, Release),
    Modern1_7_2 => ("1.7.2", 4, Modern),
    Modern1_7_6 => ("1.7.6", 5, Modern),
    Modern1_8 => ("1.8", 47, Modern),
    Bedrock1_19_30 => ("1.19.30", 554, Bedrock),
    Bedrock1_19_60 => ("1.19.60", 567, Bedrock),
    Bedrock1_20_0 => ("1.20.0", 589, Bedrock),
}

impl ProtocolVersion {
    pub const LATEST_JAVA: ProtocolVersion = ProtocolVersion::Modern1_8;
    pub const LATEST_BEDROCK: ProtocolVersion = ProtocolVersion::Bedrock1_20_0;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_at_least(self, other: ProtocolVersion) -> bool {
        self >= other
    }

    pub fn family(self) -> ProtocolFamily {
        match self.era() {
            Era::Bedrock => ProtocolFamily::Bedrock,
            _ => ProtocolFamily::Java,
        }
    }

    pub fn string_format(self) -> StringFormat {
        match self.era() {
            Era::Alpha => StringFormat::ModifiedUtf8,
            Era::Beta | Era::Release => StringFormat::Utf16,
            Era::Modern | Era::Bedrock => StringFormat::VarIntUtf8,
        }
    }

    /// Pre-netty Java versions have no outer framing.
    pub fn is_unframed(self) -> bool {
        matches!(self.era(), Era::Alpha | Era::Beta | Era::Release)
    }

    pub fn flavor(self) -> WireFlavor {
        match self.era() {
            Era::Alpha => WireFlavor::LegacyModifiedUtf8,
            Era::Beta => WireFlavor::LegacyString16,
            Era::Release => WireFlavor::LegacyVersioned,
            Era::Modern => WireFlavor::Modern,
            Era::Bedrock => WireFlavor::Bedrock,
        }
    }

    pub fn lookup(flavor: WireFlavor, number: i32) -> Option<ProtocolVersion> {
        Self::ALL
            .iter()
            .copied()
            .find(|version| version.flavor() == flavor && version.wire_number() == number)
    }

    /// Any version of the flavor, used to pick the string format before the
    /// exact version number is known.
    pub fn representative(flavor: WireFlavor) -> ProtocolVersion {
        match flavor {
            WireFlavor::LegacyModifiedUtf8 => ProtocolVersion::Alpha1_0_17,
            WireFlavor::LegacyString16 => ProtocolVersion::Beta1_5,
            WireFlavor::LegacyVersioned => ProtocolVersion::Release1_3_1,
            WireFlavor::Modern => ProtocolVersion::Modern1_7_2,
            WireFlavor::Bedrock => ProtocolVersion::Bedrock1_19_30,
        }
    }

    /// Versions of a flavor in release order, for error messages.
    pub fn supported_names(flavor: WireFlavor) -> String {
        Self::ALL
            .iter()
            .filter(|version| version.flavor() == flavor)
            .map(|version| version.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.wire_number())
    }
}

/// Inclusive range of catalog entries a packet layout applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub min: ProtocolVersion,
    pub max: ProtocolVersion,
}

impl VersionRange {
    pub const fn new(min: ProtocolVersion, max: ProtocolVersion) -> Self {
        Self { min, max }
    }

    pub const fn only(version: ProtocolVersion) -> Self {
        Self {
            min: version,
            max: version,
        }
    }

    pub fn contains(&self, version: ProtocolVersion) -> bool {
        self.min <= version && version <= self.max
    }

    /// Number of catalog entries covered.
    pub fn width(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            self.max.index() - self.min.index() + 1
        }
    }

    pub fn versions(&self) -> impl Iterator<Item = ProtocolVersion> + '_ {
        ProtocolVersion::ALL
            .iter()
            .copied()
            .filter(move |version| self.contains(*version))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min.name())
        } else {
            write!(f, "{}..={}", self.min.name(), self.max.name())
        }
    }
}
