//! crates/logging/src/levels.rs
//! Flag enums and level structures for info and debug verbosity.

/// Info flags for diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfoFlag {
    /// Miscellaneous operations.
    Misc,
    /// Per-job statistics (bytes matched, literal bytes, records).
    Stats,
}

/// Debug flags for diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFlag {
    /// Delta encoding: window matches, extensions and emitted commands.
    Deltasum,
    /// Match table construction and candidate lookups.
    Hash,
    /// Basis source reads.
    Io,
    /// Job engine state transitions.
    Job,
    /// Patch application.
    Patch,
    /// Signature generation and loading.
    Sig,
}

/// Info verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoLevels {
    /// Miscellaneous operations level.
    pub misc: u8,
    /// Statistics level.
    pub stats: u8,
}

impl InfoLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: InfoFlag) -> u8 {
        match flag {
            InfoFlag::Misc => self.misc,
            InfoFlag::Stats => self.stats,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: InfoFlag, level: u8) {
        match flag {
            InfoFlag::Misc => self.misc = level,
            InfoFlag::Stats => self.stats = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        self.misc = level;
        self.stats = level;
    }
}

/// Debug verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Delta encoding level.
    pub deltasum: u8,
    /// Match table level.
    pub hash: u8,
    /// Basis I/O level.
    pub io: u8,
    /// Job engine level.
    pub job: u8,
    /// Patch application level.
    pub patch: u8,
    /// Signature level.
    pub sig: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Deltasum => self.deltasum,
            DebugFlag::Hash => self.hash,
            DebugFlag::Io => self.io,
            DebugFlag::Job => self.job,
            DebugFlag::Patch => self.patch,
            DebugFlag::Sig => self.sig,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Deltasum => self.deltasum = level,
            DebugFlag::Hash => self.hash = level,
            DebugFlag::Io => self.io = level,
            DebugFlag::Job => self.job = level,
            DebugFlag::Patch => self.patch = level,
            DebugFlag::Sig => self.sig = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        self.deltasum = level;
        self.hash = level;
        self.io = level;
        self.job = level;
        self.patch = level;
        self.sig = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_levels_get_set_roundtrip() {
        let mut levels = InfoLevels::default();
        levels.set(InfoFlag::Stats, 3);
        assert_eq!(levels.get(InfoFlag::Stats), 3);
        assert_eq!(levels.get(InfoFlag::Misc), 0);
    }

    #[test]
    fn debug_levels_set_all() {
        let mut levels = DebugLevels::default();
        levels.set_all(2);
        for flag in [
            DebugFlag::Deltasum,
            DebugFlag::Hash,
            DebugFlag::Io,
            DebugFlag::Job,
            DebugFlag::Patch,
            DebugFlag::Sig,
        ] {
            assert_eq!(levels.get(flag), 2);
        }
    }
}
