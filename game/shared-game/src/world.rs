pub mod world {
    use std::collections::BTreeMap;

    use base_log::log::{LogLevel, SystemLog, SystemLogGroup, SystemLogInterface};
    use game_interface::types::game::{CharacterId, MAX_CLIENTS};
    use math::math::{vector::vec2, Rng};

    use crate::{
        collision::collision::Collision,
        entities::character::core::character_core::{CharacterCore, CorePipe},
        teams::teams::TeamsCore,
        tuning::tuning::{TuningError, TuningParams},
    };

    /// All character cores that can interact with each other,
    /// addressed by their slot index.
    ///
    /// Characters are always simulated in ascending slot order, a
    /// character simulated earlier in a tick already influences
    /// the ones simulated after it.
    #[derive(Debug)]
    pub struct WorldCore {
        characters: Vec<Option<CharacterCore>>,
        tuning: TuningParams,
        tele_outs: BTreeMap<u8, Vec<vec2>>,
        rng: Rng,

        log: SystemLogGroup,
    }

    impl WorldCore {
        pub fn new(tuning: TuningParams, rng_seed: u64, log: &SystemLog) -> Self {
            Self {
                characters: vec![None; MAX_CLIENTS],
                tuning,
                tele_outs: Default::default(),
                rng: Rng::new(rng_seed),
                log: log.logger("world-core"),
            }
        }

        pub fn tuning(&self) -> &TuningParams {
            &self.tuning
        }

        pub fn set_tuning(&mut self, tuning: TuningParams) {
            self.log.log(LogLevel::Debug).msg("tuning replaced");
            self.tuning = tuning;
        }

        /// Sets a single tuning by name, see [`TuningParams::try_set`].
        pub fn tune(&mut self, name: &str, value: f32) -> Result<(), TuningError> {
            self.tuning.try_set(name, value)?;
            self.log
                .log(LogLevel::Debug)
                .msg("tuning ")
                .msg(name)
                .msg(" set to ")
                .msg_var(&value);
            Ok(())
        }

        pub fn tele_outs(&self) -> &BTreeMap<u8, Vec<vec2>> {
            &self.tele_outs
        }

        /// Replaces the teleport destinations, usually [`Collision::tele_outs`].
        pub fn set_tele_outs(&mut self, tele_outs: BTreeMap<u8, Vec<vec2>>) {
            self.log
                .log(LogLevel::Debug)
                .msg("teleport destinations for ")
                .msg_var(&tele_outs.len())
                .msg(" tele numbers");
            self.tele_outs = tele_outs;
        }

        /// Puts the core into the slot `id` and binds it to that slot.
        ///
        /// Returns the core that was in the slot before. Returns the
        /// given core back as error if `id` is no valid slot.
        pub fn insert(
            &mut self,
            id: CharacterId,
            mut core: CharacterCore,
        ) -> Result<Option<CharacterCore>, CharacterCore> {
            let Some(slot) = self.characters.get_mut(id) else {
                return Err(core);
            };
            core.init(id);
            let prev = slot.replace(core);
            self.log
                .log(LogLevel::Debug)
                .msg("registered character ")
                .msg_var(&id);
            Ok(prev)
        }

        pub fn remove(&mut self, id: CharacterId) -> Option<CharacterCore> {
            let core = self.characters.get_mut(id).and_then(Option::take);
            if core.is_some() {
                self.log
                    .log(LogLevel::Debug)
                    .msg("removed character ")
                    .msg_var(&id);
            }
            core
        }

        pub fn get(&self, id: CharacterId) -> Option<&CharacterCore> {
            self.characters.get(id).and_then(Option::as_ref)
        }

        pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut CharacterCore> {
            self.characters.get_mut(id).and_then(Option::as_mut)
        }

        /// Ids of all occupied slots, ascending.
        pub fn ids(&self) -> Vec<CharacterId> {
            self.characters
                .iter()
                .enumerate()
                .filter_map(|(id, core)| core.as_ref().map(|_| id))
                .collect()
        }

        pub fn characters(&self) -> impl Iterator<Item = (CharacterId, &CharacterCore)> {
            self.characters
                .iter()
                .enumerate()
                .filter_map(|(id, core)| core.as_ref().map(|core| (id, core)))
        }

        /// Runs `f` for the character in slot `id`, with all other
        /// characters reachable through the pipe.
        fn with_character(
            &mut self,
            id: CharacterId,
            collision: &Collision,
            teams: &TeamsCore,
            f: impl FnOnce(&mut CharacterCore, &mut CorePipe),
        ) -> bool {
            let Some(mut core) = self.characters.get_mut(id).and_then(Option::take) else {
                return false;
            };
            let mut pipe = CorePipe {
                characters: &mut self.characters,
                tuning: &self.tuning,
                tele_outs: &self.tele_outs,
                rng: &mut self.rng,
                collision,
                teams,
                log: &self.log,
            };
            f(&mut core, &mut pipe);
            self.characters[id] = Some(core);
            true
        }

        /// Returns `false` if the slot is empty.
        pub fn tick_character(
            &mut self,
            id: CharacterId,
            use_input: bool,
            collision: &Collision,
            teams: &TeamsCore,
        ) -> bool {
            self.with_character(id, collision, teams, |core, pipe| {
                core.physics_tick(use_input, pipe)
            })
        }

        /// Returns `false` if the slot is empty.
        pub fn move_character(
            &mut self,
            id: CharacterId,
            collision: &Collision,
            teams: &TeamsCore,
        ) -> bool {
            self.with_character(id, collision, teams, |core, pipe| core.physics_move(pipe))
        }

        /// One full simulation step: ticks all characters, then moves and
        /// quantizes all characters.
        pub fn tick(&mut self, collision: &Collision, teams: &TeamsCore, use_input: bool) {
            let ids = self.ids();
            for id in ids.iter() {
                self.tick_character(*id, use_input, collision, teams);
            }
            for id in ids.iter() {
                self.move_character(*id, collision, teams);
                if let Some(core) = self.get_mut(*id) {
                    core.physics_quantize();
                }
            }
        }

        pub fn log(&self) -> &SystemLogGroup {
            &self.log
        }
    }

    #[cfg(test)]
    mod test {
        use base_log::log::SystemLog;
        use game_interface::types::{game::MAX_CLIENTS, input::CharacterInput};
        use math::math::vector::vec2;
        use shared_base::mapdef_06::{DdraceTileNum, TeleTile};

        use crate::{
            collision::collision::Collision,
            entities::character::{
                core::character_core::CharacterCore, hook::character_hook::HookState,
            },
            teams::teams::TeamsCore,
            tuning::tuning::TuningParams,
        };

        use super::WorldCore;

        fn core_at(x: f32, y: f32) -> CharacterCore {
            let mut core = CharacterCore::new();
            core.pos = vec2::new(x, y);
            core
        }

        #[test]
        fn slots() {
            let log = SystemLog::new();
            let mut world = WorldCore::new(TuningParams::default(), 0, &log);
            assert!(world.insert(3, core_at(10.0, 10.0)).unwrap().is_none());
            assert_eq!(world.get(3).unwrap().id(), Some(3));
            assert!(world.insert(MAX_CLIENTS, core_at(0.0, 0.0)).is_err());
            assert!(world.insert(3, core_at(20.0, 20.0)).unwrap().is_some());
            assert_eq!(world.ids(), vec![3]);
            assert!(world.remove(3).is_some());
            assert!(world.remove(3).is_none());
            assert!(world.get(usize::MAX).is_none());

            let history = world.log().history();
            assert!(history.iter().any(|item| item.msg() == "registered character 3"));
            assert!(history.iter().any(|item| item.msg() == "removed character 3"));
        }

        #[test]
        fn empty_slots_are_skipped() {
            let log = SystemLog::new();
            let mut world = WorldCore::new(TuningParams::default(), 0, &log);
            let collision = Collision::empty(10, 10).unwrap();
            let teams = TeamsCore::default();
            assert!(!world.tick_character(5, true, &collision, &teams));
            assert!(!world.move_character(MAX_CLIENTS + 1, &collision, &teams));
            world.tick(&collision, &teams, true);
        }

        #[test]
        fn tune_through_world() {
            let log = SystemLog::new();
            let mut world = WorldCore::new(TuningParams::default(), 0, &log);
            world.tune("Gravity", 0.25).unwrap();
            assert_eq!(world.tuning().gravity, 0.25);
            assert!(world.tune("gravity2", 0.25).is_err());
            assert_eq!(world.tuning().gravity, 0.25);
        }

        #[test]
        fn world_tick_moves_and_quantizes() {
            let log = SystemLog::new();
            let mut world = WorldCore::new(TuningParams::default(), 0, &log);
            let collision = Collision::empty(50, 50).unwrap();
            let teams = TeamsCore::default();
            world.insert(0, core_at(400.3, 400.0)).unwrap();
            world.get_mut(0).unwrap().set_input(CharacterInput {
                direction: 1,
                ..Default::default()
            });

            world.tick(&collision, &teams, true);
            let core = world.get(0).unwrap();
            assert!(core.pos.x > 400.0);
            assert!(core.pos.y > 400.0);
            assert_eq!(core.pos.x, core.pos.x.round());
            assert_eq!(core.vel.x * 256.0, (core.vel.x * 256.0).round());
        }

        #[test]
        fn seeded_teleporter_choice() {
            let run = |seed: u64| {
                let log = SystemLog::new();
                let mut collision = Collision::empty(100, 100).unwrap();
                let mut tele = vec![TeleTile::default(); 100 * 100];
                tele[31 * 100 + 36] = TeleTile::new(DdraceTileNum::TeleInHook, 2);
                for x in 0..10 {
                    tele[5 * 100 + x * 5] = TeleTile::new(DdraceTileNum::TeleOut, 2);
                }
                collision.set_tele_layer(tele).unwrap();
                let teams = TeamsCore::default();

                let mut tuning = TuningParams::default();
                tuning.gravity = 0.0;
                let mut world = WorldCore::new(tuning, seed, &log);
                world.set_tele_outs(collision.tele_outs());
                world.insert(0, core_at(1008.0, 1008.0)).unwrap();
                world.get_mut(0).unwrap().set_input(CharacterInput {
                    target_x: 1,
                    target_y: 0,
                    hook: true,
                    ..Default::default()
                });
                let mut hook_positions = Vec::new();
                for _ in 0..2 {
                    world.tick_character(0, true, &collision, &teams);
                    hook_positions.push(world.get(0).unwrap().hook_pos);
                }
                let core = world.get(0).unwrap();
                assert_eq!(core.hook_state, HookState::Flying);
                assert!(core.new_hook);
                (hook_positions, collision.tele_outs()[&2].clone())
            };

            let (first, outs) = run(7);
            let (second, _) = run(7);
            assert_eq!(first, second);
            let tip = first[1];
            assert!(outs
                .iter()
                .any(|out| *out + vec2::new(42.0, 0.0) == tip));
        }
    }
}
