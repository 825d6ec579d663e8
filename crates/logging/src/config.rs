//! crates/logging/src/config.rs
//! Verbosity configuration combining info and debug levels.

use super::levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};

/// Combined verbosity configuration for info and debug flags.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Info flag levels.
    pub info: InfoLevels,
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (0-4).
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.info.misc = 1;
                config.info.stats = 1;
            }
            2 => {
                config.info.misc = 2;
                config.info.stats = 1;
                config.debug.sig = 1;
                config.debug.deltasum = 1;
                config.debug.patch = 1;
            }
            3 => {
                config.info.misc = 2;
                config.info.stats = 2;
                config.debug.sig = 2;
                config.debug.deltasum = 2;
                config.debug.patch = 2;
                config.debug.hash = 1;
                config.debug.job = 1;
            }
            _ => {
                config.info.set_all(2);
                config.debug.sig = 3;
                config.debug.deltasum = 4;
                config.debug.patch = 3;
                config.debug.hash = 2;
                config.debug.job = 2;
                config.debug.io = 2;
            }
        }

        config
    }

    /// Apply a single info flag token (e.g., "stats2", "misc").
    pub fn apply_info_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        let flag = match name {
            "misc" => InfoFlag::Misc,
            "stats" => InfoFlag::Stats,
            "all" => {
                self.info.set_all(level);
                return Ok(());
            }
            _ => return Err(format!("unknown info flag: {name}")),
        };

        self.info.set(flag, level);
        Ok(())
    }

    /// Apply a single debug flag token (e.g., "deltasum2", "patch").
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        let flag = match name {
            "deltasum" => DebugFlag::Deltasum,
            "hash" => DebugFlag::Hash,
            "io" => DebugFlag::Io,
            "job" => DebugFlag::Job,
            "patch" => DebugFlag::Patch,
            "sig" => DebugFlag::Sig,
            "all" => {
                self.debug.set_all(level);
                return Ok(());
            }
            _ => return Err(format!("unknown debug flag: {name}")),
        };

        self.debug.set(flag, level);
        Ok(())
    }
}

/// Parse a flag token like "deltasum2" into ("deltasum", 2) or "sig" into ("sig", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    let digit_start = token.find(|c: char| c.is_ascii_digit());

    match digit_start {
        Some(0) => Err(format!("flag token is missing a name: {token}")),
        Some(pos) => {
            let name = &token[..pos];
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((name, level))
        }
        None => Ok((token, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_verbose_level_0_is_silent() {
        assert_eq!(VerbosityConfig::from_verbose_level(0), VerbosityConfig::default());
    }

    #[test]
    fn from_verbose_level_2_enables_core_debug() {
        let config = VerbosityConfig::from_verbose_level(2);
        assert_eq!(config.info.misc, 2);
        assert_eq!(config.debug.sig, 1);
        assert_eq!(config.debug.deltasum, 1);
        assert_eq!(config.debug.patch, 1);
        assert_eq!(config.debug.hash, 0);
    }

    #[test]
    fn high_levels_saturate() {
        assert_eq!(
            VerbosityConfig::from_verbose_level(9),
            VerbosityConfig::from_verbose_level(4)
        );
    }

    #[test]
    fn parse_flag_token_defaults_to_level_one() {
        assert_eq!(parse_flag_token("sig").unwrap(), ("sig", 1));
        assert_eq!(parse_flag_token("deltasum3").unwrap(), ("deltasum", 3));
    }

    #[test]
    fn parse_flag_token_rejects_bad_input() {
        assert!(parse_flag_token("").is_err());
        assert!(parse_flag_token("2").is_err());
        assert!(parse_flag_token("sig999").is_err());
    }

    #[test]
    fn apply_all_sets_every_flag() {
        let mut config = VerbosityConfig::default();
        config.apply_debug_flag("all2").unwrap();
        assert_eq!(config.debug.io, 2);
        assert_eq!(config.debug.job, 2);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let mut config = VerbosityConfig::default();
        assert!(config.apply_debug_flag("flist").is_err());
        assert!(config.apply_info_flag("copy").is_err());
    }
}
