pub mod tuning {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum TuningError {
        #[error("unknown tuning name: {0}")]
        UnknownName(String),
        #[error("tuning index {index} out of range (0..{num})")]
        IndexOutOfRange { index: usize, num: usize },
        #[error("tuning {name} must be a finite value, got {value}")]
        NotFinite { name: String, value: f32 },
    }

    macro_rules! tuning_params {
        ($(($field:ident, $name:literal, $default:expr)),* $(,)?) => {
            /// The physics constants of a world.
            ///
            /// Every entry is declared once, the name table, the value
            /// accessors and the defaults are generated from the same list,
            /// so the index of a name always resolves to the same value.
            #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
            #[serde(default)]
            pub struct TuningParams {
                $(pub $field: f32,)*
            }

            impl Default for TuningParams {
                fn default() -> Self {
                    Self {
                        $($field: $default,)*
                    }
                }
            }

            const TUNING_NAMES: &[&str] = &[$($name,)*];
            const NUM_TUNINGS: usize = TUNING_NAMES.len();

            impl TuningParams {
                const NAMES: &'static [&'static str] = TUNING_NAMES;

                fn values(&self) -> [&f32; NUM_TUNINGS] {
                    [$(&self.$field,)*]
                }

                fn values_mut(&mut self) -> [&mut f32; NUM_TUNINGS] {
                    [$(&mut self.$field,)*]
                }
            }
        };
    }

    tuning_params!(
        (ground_control_speed, "ground_control_speed", 10.0),
        (ground_control_accel, "ground_control_accel", 100.0 / 50.0),
        (ground_friction, "ground_friction", 0.5),
        (ground_jump_impulse, "ground_jump_impulse", 13.2),
        (air_jump_impulse, "air_jump_impulse", 12.0),
        (air_control_speed, "air_control_speed", 250.0 / 50.0),
        (air_control_accel, "air_control_accel", 1.5),
        (air_friction, "air_friction", 0.95),
        (hook_length, "hook_length", 380.0),
        (hook_fire_speed, "hook_fire_speed", 80.0),
        (hook_drag_accel, "hook_drag_accel", 3.0),
        (hook_drag_speed, "hook_drag_speed", 15.0),
        (gravity, "gravity", 0.5),
        (velramp_start, "velramp_start", 550.0),
        (velramp_range, "velramp_range", 2000.0),
        (velramp_curvature, "velramp_curvature", 1.4),
        (gun_curvature, "gun_curvature", 1.25),
        (gun_speed, "gun_speed", 2200.0),
        (gun_lifetime, "gun_lifetime", 2.0),
        (shotgun_curvature, "shotgun_curvature", 1.25),
        (shotgun_speed, "shotgun_speed", 2750.0),
        (shotgun_speeddiff, "shotgun_speeddiff", 0.8),
        (shotgun_lifetime, "shotgun_lifetime", 0.20),
        (grenade_curvature, "grenade_curvature", 7.0),
        (grenade_speed, "grenade_speed", 1000.0),
        (grenade_lifetime, "grenade_lifetime", 2.0),
        (laser_reach, "laser_reach", 800.0),
        (laser_bounce_delay, "laser_bounce_delay", 150.0),
        (laser_bounce_num, "laser_bounce_num", 1000.0),
        (laser_bounce_cost, "laser_bounce_cost", 0.0),
        (laser_damage, "laser_damage", 5.0),
        (player_collision, "player_collision", 1.0),
        (player_hooking, "player_hooking", 1.0),
        (jetpack_strength, "jetpack_strength", 400.0),
        (shotgun_strength, "shotgun_strength", 10.0),
        (explosion_strength, "explosion_strength", 6.0),
        (hammer_strength, "hammer_strength", 1.0),
    );

    impl TuningParams {
        /// Number of tuning params.
        pub const fn num() -> usize {
            NUM_TUNINGS
        }

        pub fn name(index: usize) -> Option<&'static str> {
            Self::NAMES.get(index).copied()
        }

        /// Index of the (case insensitive) name.
        pub fn index_of(name: &str) -> Option<usize> {
            Self::NAMES
                .iter()
                .position(|param| param.eq_ignore_ascii_case(name))
        }

        /// Returns `false` without touching anything if `index` is out of range.
        pub fn set(&mut self, index: usize, value: f32) -> bool {
            match self.values_mut().into_iter().nth(index) {
                Some(param) => {
                    *param = value;
                    true
                }
                None => false,
            }
        }

        pub fn get(&self, index: usize) -> Option<f32> {
            self.values().get(index).map(|v| **v)
        }

        /// Returns `false` without touching anything if no param has this name.
        pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
            Self::index_of(name).is_some_and(|index| self.set(index, value))
        }

        pub fn get_by_name(&self, name: &str) -> Option<f32> {
            Self::index_of(name).and_then(|index| self.get(index))
        }

        /// Like [`TuningParams::set_by_name`], but explains why it failed.
        /// Also refuses NaN and infinite values.
        pub fn try_set(&mut self, name: &str, value: f32) -> Result<(), TuningError> {
            let index =
                Self::index_of(name).ok_or_else(|| TuningError::UnknownName(name.to_string()))?;
            if !value.is_finite() {
                return Err(TuningError::NotFinite {
                    name: name.to_string(),
                    value,
                });
            }
            if self.set(index, value) {
                Ok(())
            } else {
                Err(TuningError::IndexOutOfRange {
                    index,
                    num: Self::num(),
                })
            }
        }

        /// Applies all overrides or none of them.
        pub fn apply_overrides(
            &mut self,
            overrides: &BTreeMap<String, f32>,
        ) -> Result<(), TuningError> {
            let mut tuning = *self;
            for (name, value) in overrides {
                tuning.try_set(name, *value)?;
            }
            *self = tuning;
            Ok(())
        }

        /// All params whose name contains `search` (case insensitive),
        /// in table order. Used for console completion.
        pub fn possible_tunings(search: &str) -> Vec<(usize, &'static str)> {
            let search = search.to_ascii_lowercase();
            Self::NAMES
                .iter()
                .enumerate()
                .filter(|(_, name)| name.to_ascii_lowercase().contains(&search))
                .map(|(index, name)| (index, *name))
                .collect()
        }

        /// Iterates `(name, value)` in table order.
        pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
            Self::NAMES
                .iter()
                .copied()
                .zip(self.values().into_iter().copied())
        }
    }

    #[cfg(test)]
    mod test {
        use std::collections::BTreeMap;

        use super::{TuningError, TuningParams};

        #[test]
        fn names_and_values_aligned() {
            let tuning = TuningParams::default();
            assert_eq!(tuning.iter().count(), TuningParams::num());
            for (index, (name, value)) in tuning.iter().enumerate() {
                assert_eq!(TuningParams::name(index), Some(name));
                assert_eq!(TuningParams::index_of(name), Some(index));
                assert_eq!(tuning.get(index), Some(value));
            }
            assert_eq!(tuning.get_by_name("gravity"), Some(tuning.gravity));
            assert_eq!(tuning.get_by_name("hook_length"), Some(tuning.hook_length));
        }

        #[test]
        fn set_then_get_is_exact() {
            let mut tuning = TuningParams::default();
            let values = [0.0, -1.5, 0.123_456_79, 1e-30, 12345.678, f32::MAX];
            for (index, name) in TuningParams::NAMES.iter().enumerate() {
                let value = values[index % values.len()];
                assert!(tuning.set_by_name(name, value));
                assert_eq!(tuning.get_by_name(name), Some(value));
                assert_eq!(tuning.get(index), Some(value));
            }
        }

        #[test]
        fn names_are_case_insensitive() {
            let mut tuning = TuningParams::default();
            assert!(tuning.set_by_name("Hook_Fire_SPEED", 40.0));
            assert_eq!(tuning.hook_fire_speed, 40.0);
            assert_eq!(tuning.get_by_name("HOOK_FIRE_SPEED"), Some(40.0));
        }

        #[test]
        fn invalid_lookups_fail_without_mutation() {
            let mut tuning = TuningParams::default();
            let before = tuning;
            assert!(!tuning.set(TuningParams::num(), 1.0));
            assert!(!tuning.set(usize::MAX, 1.0));
            assert!(!tuning.set_by_name("gravityy", 1.0));
            assert!(!tuning.set_by_name("", 1.0));
            assert_eq!(tuning.get(TuningParams::num()), None);
            assert_eq!(tuning.get_by_name("no_such_tune"), None);
            assert_eq!(tuning, before);
        }

        #[test]
        fn try_set_reports_errors() {
            let mut tuning = TuningParams::default();
            assert_eq!(
                tuning.try_set("foo", 1.0),
                Err(TuningError::UnknownName("foo".to_string()))
            );
            assert!(matches!(
                tuning.try_set("gravity", f32::NAN),
                Err(TuningError::NotFinite { .. })
            ));
            assert_eq!(tuning.gravity, TuningParams::default().gravity);
        }

        #[test]
        fn overrides_are_all_or_nothing() {
            let mut tuning = TuningParams::default();
            let mut overrides = BTreeMap::new();
            overrides.insert("gravity".to_string(), 0.25);
            overrides.insert("unknown".to_string(), 2.0);
            assert!(tuning.apply_overrides(&overrides).is_err());
            assert_eq!(tuning, TuningParams::default());

            overrides.remove("unknown");
            tuning.apply_overrides(&overrides).unwrap();
            assert_eq!(tuning.gravity, 0.25);
        }

        #[test]
        fn possible_tunings_in_table_order() {
            let found = TuningParams::possible_tunings("HOOK_");
            let names: Vec<_> = found.iter().map(|(_, name)| *name).collect();
            assert_eq!(
                names,
                vec![
                    "hook_length",
                    "hook_fire_speed",
                    "hook_drag_accel",
                    "hook_drag_speed"
                ]
            );
            assert!(TuningParams::possible_tunings("xyz").is_empty());
        }

        #[test]
        fn deserialize_with_defaults() {
            let tuning: TuningParams = serde_json::from_str(r#"{"gravity": 0.75}"#).unwrap();
            assert_eq!(tuning.gravity, 0.75);
            assert_eq!(tuning.hook_length, TuningParams::default().hook_length);
        }
    }
}
