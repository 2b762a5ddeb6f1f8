pub mod config {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use crate::{
        teams::teams::TeamsCore,
        tuning::tuning::{TuningError, TuningParams},
    };

    /// Everything needed to set up a world, usually loaded from json.
    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct PhysicsConfig {
        /// Use the 16 slot ruleset, changes the super team.
        pub ddrace16: bool,
        /// Seed for the teleporter destination choice.
        pub rng_seed: u64,
        /// Tuning overrides by name.
        pub tune: BTreeMap<String, f32>,
    }

    impl PhysicsConfig {
        pub fn from_json(json: &str) -> serde_json::Result<Self> {
            serde_json::from_str(json)
        }

        pub fn to_json(&self) -> serde_json::Result<String> {
            serde_json::to_string_pretty(self)
        }

        /// The default tuning with all overrides applied.
        pub fn tuning(&self) -> Result<TuningParams, TuningError> {
            let mut tuning = TuningParams::default();
            tuning.apply_overrides(&self.tune)?;
            Ok(tuning)
        }

        pub fn teams(&self) -> TeamsCore {
            TeamsCore::new(self.ddrace16)
        }
    }

    #[cfg(test)]
    mod test {
        use game_interface::types::game::VANILLA_MAX_CLIENTS;

        use crate::tuning::tuning::{TuningError, TuningParams};

        use super::PhysicsConfig;

        #[test]
        fn missing_fields_use_defaults() {
            let config = PhysicsConfig::from_json("{}").unwrap();
            assert_eq!(config, PhysicsConfig::default());
            assert_eq!(config.tuning().unwrap(), TuningParams::default());
        }

        #[test]
        fn overrides() {
            let config = PhysicsConfig::from_json(
                r#"{ "ddrace16": true, "rng_seed": 9, "tune": { "gravity": 0.25, "hook_length": 500 } }"#,
            )
            .unwrap();
            assert_eq!(config.rng_seed, 9);
            assert_eq!(config.teams().super_team(), VANILLA_MAX_CLIENTS);

            let tuning = config.tuning().unwrap();
            assert_eq!(tuning.gravity, 0.25);
            assert_eq!(tuning.hook_length, 500.0);
            assert_eq!(
                tuning.ground_control_speed,
                TuningParams::default().ground_control_speed
            );

            let json = config.to_json().unwrap();
            assert_eq!(PhysicsConfig::from_json(&json).unwrap(), config);
        }

        #[test]
        fn unknown_tuning_is_an_error() {
            let config =
                PhysicsConfig::from_json(r#"{ "tune": { "gravity": 0.1, "moon_gravity": 1 } }"#)
                    .unwrap();
            assert_eq!(
                config.tuning(),
                Err(TuningError::UnknownName("moon_gravity".to_string()))
            );
        }

        #[test]
        fn malformed_json() {
            assert!(PhysicsConfig::from_json(r#"{ "rng_seed": -1 }"#).is_err());
            assert!(PhysicsConfig::from_json("[").is_err());
        }
    }
}
