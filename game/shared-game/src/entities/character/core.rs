pub mod character_core {
    use std::{collections::BTreeMap, ops::AddAssign};

    use base_log::log::{LogLevel, SystemLogGroup, SystemLogInterface};
    use bincode::{Decode, Encode};
    use game_interface::{
        events::CoreEvents,
        types::{
            game::{CharacterId, MAX_CLIENTS, TICKS_PER_SECOND},
            input::CharacterInput,
        },
    };
    use math::math::{
        closest_point_on_line, distance, dot, length, mix, normalize, round_to_int,
        vector::vec2, Rng, PI,
    };
    use num_traits::Zero;
    use serde::{Deserialize, Serialize};
    use shared_base::mapdef_06::CollisionFlags;
    use thiserror::Error;

    use crate::{
        collision::collision::Collision,
        entities::character::{
            hook::character_hook::HookState,
            tiles::character_tiles::{clamp_vel, CharacterTiles},
        },
        teams::teams::TeamsCore,
        tuning::tuning::TuningParams,
    };

    pub const PHYSICAL_SIZE: f32 = 28.0;
    const fn physical_size() -> f32 {
        PHYSICAL_SIZE
    }
    const fn physical_size_vec2() -> vec2 {
        vec2::new(PHYSICAL_SIZE, PHYSICAL_SIZE)
    }

    /// Upper bound of the velocity's length after every tick.
    pub const MAX_VELOCITY: f32 = 6000.0;

    /// Ticks a character can be held by a hook.
    const HOOK_PLAYER_DURATION: i32 = (TICKS_PER_SECOND + TICKS_PER_SECOND / 5) as i32;

    #[derive(Error, Debug)]
    pub enum WireError {
        #[error("failed to encode the character core: {0}")]
        Encode(#[from] bincode::error::EncodeError),
        #[error("failed to decode the character core: {0}")]
        Decode(#[from] bincode::error::DecodeError),
        #[error("{0} trailing bytes after the character core")]
        TrailingBytes(usize),
    }

    /// The character core as it is sent over the network.
    ///
    /// Velocities and the hook direction are fixed point values with
    /// 8 fractional bits, positions are whole units.
    #[derive(
        Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
    )]
    pub struct NetObjCharacterCore {
        pub x: i32,
        pub y: i32,
        pub vel_x: i32,
        pub vel_y: i32,
        pub hook_state: i32,
        pub hook_tick: i32,
        pub hook_x: i32,
        pub hook_y: i32,
        pub hook_dx: i32,
        pub hook_dy: i32,
        /// `-1` if no character is hooked
        pub hooked_player: i32,
        pub jumped: i32,
        pub direction: i32,
        pub angle: i32,
    }

    impl NetObjCharacterCore {
        pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
            Ok(bincode::encode_to_vec(*self, bincode::config::standard())?)
        }

        pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
            let (res, read): (Self, usize) =
                bincode::decode_from_slice(bytes, bincode::config::standard())?;
            if read != bytes.len() {
                return Err(WireError::TrailingBytes(bytes.len() - read));
            }
            Ok(res)
        }
    }

    /// Everything a character core reads or modifies during a tick,
    /// except the character itself.
    pub struct CorePipe<'a> {
        /// All character slots of the world, the simulated character's
        /// own slot is empty while it is simulated.
        pub characters: &'a mut [Option<CharacterCore>],
        pub tuning: &'a TuningParams,
        pub tele_outs: &'a BTreeMap<u8, Vec<vec2>>,
        pub rng: &'a mut Rng,
        pub collision: &'a Collision,
        pub teams: &'a TeamsCore,
        pub log: &'a SystemLogGroup,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CharacterCore {
        id: Option<CharacterId>,

        pub pos: vec2,
        pub vel: vec2,

        pub hook_pos: vec2,
        pub hook_dir: vec2,
        pub hook_tele_base: vec2,
        pub hook_tick: i32,
        pub hook_state: HookState,
        /// Only set while the hook is [`HookState::Grabbed`].
        pub hooked_player: Option<CharacterId>,
        /// The flying hook went through a teleporter, its length
        /// is measured from [`CharacterCore::hook_tele_base`].
        pub new_hook: bool,

        /// 1 bit = a jump was made with the current jump press,
        /// 2 bit = the air jump is used up
        pub jumped: i32,
        /// jumps since the character touched the ground
        pub jumped_total: i32,
        pub jumps: i32,

        pub direction: i32,
        pub angle: i32,
        pub input: CharacterInput,

        pub triggered_events: CoreEvents,

        /// can hook and be hooked by other characters
        pub hook_enabled: bool,
        /// collides with other characters
        pub collision_enabled: bool,

        tiles: CharacterTiles,
    }

    impl Default for CharacterCore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CharacterCore {
        pub fn new() -> Self {
            Self {
                id: None,
                pos: vec2::default(),
                vel: vec2::default(),
                hook_pos: vec2::default(),
                hook_dir: vec2::default(),
                hook_tele_base: vec2::default(),
                hook_tick: 0,
                hook_state: HookState::Idle,
                hooked_player: None,
                new_hook: false,
                jumped: 0,
                jumped_total: 0,
                jumps: 2,
                direction: 0,
                angle: 0,
                input: CharacterInput::default(),
                triggered_events: CoreEvents::empty(),
                hook_enabled: true,
                collision_enabled: true,
                tiles: CharacterTiles::default(),
            }
        }

        /// Binds the core to its slot in the world.
        pub fn init(&mut self, id: CharacterId) {
            self.id = Some(id);
            self.hook_enabled = true;
            self.collision_enabled = true;
            self.jumped_total = 0;
            self.jumps = 2;
        }

        /// Resets all simulated state, the slot stays the same.
        pub fn reset(&mut self) {
            *self = Self {
                id: self.id,
                input: self.input,
                ..Self::new()
            };
        }

        pub fn id(&self) -> Option<CharacterId> {
            self.id
        }

        /// The tiles cached by the last tick.
        pub fn tiles(&self) -> &CharacterTiles {
            &self.tiles
        }

        pub fn set_input(&mut self, input: CharacterInput) {
            self.input = input;
        }

        fn saturated_add<T: AddAssign + PartialOrd + Zero>(
            min_val: T,
            max_val: T,
            current: T,
            modifier: T,
        ) -> T {
            let mut cur = current;
            if modifier < T::zero() {
                if cur < min_val {
                    return cur;
                }
                cur += modifier;
                if cur < min_val {
                    cur = min_val;
                }
                cur
            } else {
                if cur > max_val {
                    return cur;
                }
                cur += modifier;
                if cur > max_val {
                    cur = max_val;
                }
                cur
            }
        }

        fn velocity_ramp(value: f32, start: f32, range: f32, curvature: f32) -> f32 {
            if value < start {
                return 1.0;
            }
            1.0 / curvature.powf((value - start) / range)
        }

        /// Whether the switch layer at `map_index` applies to this character.
        fn is_right_team(&self, collision: &Collision, teams: &TeamsCore, map_index: usize) -> bool {
            let Some(switchers) = collision.switchers() else {
                return false;
            };
            let Some(team) = self.id.and_then(|id| teams.team(id)) else {
                return false;
            };
            if team == teams.super_team() {
                return true;
            }
            switchers.status(collision.get_d_tile_number(map_index), team)
        }

        fn release_hook(&mut self, state: HookState) {
            self.hooked_player = None;
            self.hook_state = state;
            self.hook_pos = self.pos;
        }

        fn is_other(&self, id: CharacterId) -> bool {
            self.id != Some(id)
        }

        /// Advances the character by one tick, without moving it.
        ///
        /// `use_input` is `false` for ticks that are predicted without
        /// a fresh input.
        pub fn physics_tick(&mut self, use_input: bool, pipe: &mut CorePipe) {
            let tuning = *pipe.tuning;
            let collision = pipe.collision;

            let tiles = CharacterTiles::sample(collision, &self.pos, |index| {
                use_input && self.is_right_team(collision, pipe.teams, index)
            });
            self.tiles = tiles;
            self.triggered_events = CoreEvents::empty();

            // get ground state
            let grounded = collision.check_point(
                self.pos.x + physical_size() / 2.0,
                self.pos.y + physical_size() / 2.0 + 5.0,
            ) || collision.check_point(
                self.pos.x - physical_size() / 2.0,
                self.pos.y + physical_size() / 2.0 + 5.0,
            );

            let target_direction = normalize(&self.input.target());

            self.vel.y += tuning.gravity;

            let (max_speed, accel, friction) = if grounded {
                (
                    tuning.ground_control_speed,
                    tuning.ground_control_accel,
                    tuning.ground_friction,
                )
            } else {
                (
                    tuning.air_control_speed,
                    tuning.air_control_accel,
                    tuning.air_friction,
                )
            };

            // handle input
            if use_input {
                self.direction = self.input.direction;

                // setup angle
                let mut a = if self.input.target_x == 0 {
                    (self.input.target_y as f32).atan()
                } else {
                    (self.input.target_y as f32 / self.input.target_x as f32).atan()
                };
                if self.input.target_x < 0 {
                    a += PI;
                }
                self.angle = (a * 256.0) as i32;

                // handle jump
                if self.input.jump {
                    if (self.jumped & 1) == 0 {
                        if grounded {
                            self.triggered_events |= CoreEvents::GROUND_JUMP;
                            self.vel.y = -tuning.ground_jump_impulse;
                            self.jumped |= 1;
                            self.jumped_total = 1;
                        } else if (self.jumped & 2) == 0 {
                            self.triggered_events |= CoreEvents::AIR_JUMP;
                            self.vel.y = -tuning.air_jump_impulse;
                            self.jumped |= 3;
                            self.jumped_total += 1;
                        }
                    }
                } else {
                    self.jumped &= !1;
                }

                // handle hook
                if self.input.hook {
                    if self.hook_state == HookState::Idle {
                        self.hook_state = HookState::Flying;
                        self.hook_pos = self.pos + target_direction * physical_size() * 1.5;
                        self.hook_dir = target_direction;
                        self.hooked_player = None;
                        self.hook_tick = 0;
                        self.triggered_events |= CoreEvents::HOOK_LAUNCH;
                    }
                } else {
                    self.release_hook(HookState::Idle);
                }
            }

            // add the speed modification according to players wanted direction
            if self.direction < 0 {
                self.vel.x = Self::saturated_add(-max_speed, max_speed, self.vel.x, -accel);
            }
            if self.direction > 0 {
                self.vel.x = Self::saturated_add(-max_speed, max_speed, self.vel.x, accel);
            }
            if self.direction == 0 {
                self.vel.x *= friction;
            }

            // the air jump is refilled on the ground
            if grounded {
                self.jumped &= !2;
                self.jumped_total = 0;
            }

            self.hook_tick_state(&tuning, &target_direction, pipe);
            if self.hook_state == HookState::Grabbed {
                self.hook_tick_grabbed(&tuning, pipe);
            }

            self.interact_with_others(&tuning, pipe);

            if self.hook_state != HookState::Flying {
                self.new_hook = false;
            }

            // clamp the velocity to something sane
            if length(&self.vel) > MAX_VELOCITY {
                self.vel = normalize(&self.vel) * MAX_VELOCITY;
            }
        }

        fn hook_tick_state(
            &mut self,
            tuning: &TuningParams,
            target_direction: &vec2,
            pipe: &mut CorePipe,
        ) {
            match self.hook_state {
                HookState::Idle => {
                    self.release_hook(HookState::Idle);
                }
                HookState::RetractStart | HookState::Retracting => {
                    self.hook_state = self.hook_state.next_retract();
                }
                HookState::RetractEnd => {
                    self.hook_state = HookState::Retracted;
                    self.triggered_events |= CoreEvents::HOOK_RETRACT;
                }
                HookState::Flying => self.hook_tick_flying(tuning, target_direction, pipe),
                HookState::Retracted | HookState::Grabbed => {}
            }
        }

        fn hook_tick_flying(
            &mut self,
            tuning: &TuningParams,
            target_direction: &vec2,
            pipe: &mut CorePipe,
        ) {
            let mut new_pos = self.hook_pos + self.hook_dir * tuning.hook_fire_speed;
            let hook_base = if self.new_hook {
                self.hook_tele_base
            } else {
                self.pos
            };
            if distance(&hook_base, &new_pos) > tuning.hook_length {
                self.hook_state = HookState::RetractStart;
                new_pos = self.pos + normalize(&(new_pos - self.pos)) * tuning.hook_length;
            }

            // make sure that the hook doesn't go though the ground
            let mut tele_nr = 0;
            let mut before_col = vec2::default();
            let line_end = new_pos;
            let hit = pipe.collision.intersect_line_tele_hook(
                &self.hook_pos,
                &line_end,
                &mut new_pos,
                &mut before_col,
                &mut tele_nr,
            );
            let going_to_retract = hit.contains(CollisionFlags::NOHOOK);
            let going_through_tele = !going_to_retract && hit.contains(CollisionFlags::TELE);
            let going_to_hit_ground = !hit.is_empty() && !going_to_retract && !going_through_tele;

            // check against other characters first
            if self.hook_enabled && tuning.player_hooking != 0.0 {
                let mut hook_distance = 0.0;
                for (i, other) in pipe.characters.iter().enumerate() {
                    let Some(other) = other else {
                        continue;
                    };
                    let can_collide = self.id.is_some_and(|id| pipe.teams.can_collide(i, id));
                    if !self.is_other(i) || !can_collide || !other.hook_enabled {
                        continue;
                    }

                    let closest_point = closest_point_on_line(&self.hook_pos, &new_pos, &other.pos);
                    if distance(&other.pos, &closest_point) < physical_size() + 2.0
                        && (self.hooked_player.is_none()
                            || distance(&self.hook_pos, &other.pos) < hook_distance)
                    {
                        self.triggered_events |= CoreEvents::HOOK_ATTACH_PLAYER;
                        self.hook_state = HookState::Grabbed;
                        self.hooked_player = Some(i);
                        hook_distance = distance(&self.hook_pos, &other.pos);
                    }
                }
            }

            if self.hook_state != HookState::Flying {
                return;
            }

            if going_to_hit_ground {
                self.triggered_events |= CoreEvents::HOOK_ATTACH_GROUND;
                self.hook_state = HookState::Grabbed;
            } else if going_to_retract {
                self.triggered_events |= CoreEvents::HOOK_HIT_NOHOOK;
                self.hook_state = HookState::RetractStart;
            }

            let tele_outs = pipe.tele_outs;
            let tele_out = if going_through_tele {
                tele_outs.get(&tele_nr).filter(|outs| !outs.is_empty())
            } else {
                None
            };
            match tele_out {
                Some(outs) => {
                    self.triggered_events = CoreEvents::empty();
                    self.hooked_player = None;

                    self.new_hook = true;
                    let out = outs[pipe.rng.random_or_0(outs.len())];
                    self.hook_pos = out + *target_direction * physical_size() * 1.5;
                    self.hook_dir = *target_direction;
                    self.hook_tele_base = self.hook_pos;
                }
                None => {
                    if going_through_tele {
                        pipe.log
                            .log(LogLevel::Verbose)
                            .msg("hook went through teleporter ")
                            .msg_var(&tele_nr)
                            .msg(" without destinations");
                    }
                    self.hook_pos = new_pos;
                }
            }
        }

        fn hook_tick_grabbed(&mut self, tuning: &TuningParams, pipe: &mut CorePipe) {
            if let Some(hooked_player) = self.hooked_player {
                match pipe.characters.get(hooked_player).and_then(Option::as_ref) {
                    Some(other) => self.hook_pos = other.pos,
                    None => {
                        pipe.log
                            .log(LogLevel::Verbose)
                            .msg("released hook of vanished character ")
                            .msg_var(&hooked_player);
                        self.release_hook(HookState::Retracted);
                    }
                }
            }

            // don't do this hook routine when we are hooked to a character
            if self.hooked_player.is_none() && distance(&self.hook_pos, &self.pos) > 46.0 {
                let mut hook_vel = normalize(&(self.hook_pos - self.pos)) * tuning.hook_drag_accel;
                // the hook has more power to drag you up than down.
                // this makes it easier to get on top of a platform
                if hook_vel.y > 0.0 {
                    hook_vel.y *= 0.3;
                }

                // the hook will boost its power if the character wants to move
                // in that direction. otherwise it will dampen everything a bit
                if (hook_vel.x < 0.0 && self.direction < 0)
                    || (hook_vel.x > 0.0 && self.direction > 0)
                {
                    hook_vel.x *= 0.95;
                } else {
                    hook_vel.x *= 0.75;
                }

                let new_vel = self.vel + hook_vel;

                // check if we are under the legal limit for the hook
                if length(&new_vel) < tuning.hook_drag_speed
                    || length(&new_vel) < length(&self.vel)
                {
                    self.vel = new_vel;
                }
            }

            // release hook
            self.hook_tick = self.hook_tick.saturating_add(1);
            if let Some(hooked_player) = self.hooked_player {
                let vanished = pipe
                    .characters
                    .get(hooked_player)
                    .map_or(true, Option::is_none);
                if self.hook_tick > HOOK_PLAYER_DURATION || vanished {
                    self.release_hook(HookState::Retracted);
                }
            }
        }

        /// Collision with other characters and the pull of a hooked character.
        ///
        /// Modifies the velocity of the other characters, so characters
        /// simulated later in the same tick see the changes.
        fn interact_with_others(&mut self, tuning: &TuningParams, pipe: &mut CorePipe) {
            let teams = pipe.teams;
            for (i, other) in pipe.characters.iter_mut().enumerate() {
                let Some(other) = other else {
                    continue;
                };
                if !self.is_other(i) || self.id.is_some_and(|id| !teams.can_collide(id, i)) {
                    continue;
                }

                // handle character <-> character collision
                let dist = distance(&self.pos, &other.pos);
                let dir = normalize(&(self.pos - other.pos));
                if other.collision_enabled
                    && self.collision_enabled
                    && tuning.player_collision != 0.0
                    && dist < physical_size() * 1.25
                    && dist > 0.0
                {
                    let a = physical_size() * 1.45 - dist;
                    let mut velocity = 0.5;

                    // make sure that we don't add excess force by checking the
                    // direction against the current velocity. if not zero.
                    if length(&self.vel) > 0.0001 {
                        velocity = 1.0 - (dot(&normalize(&self.vel), &dir) + 1.0) / 2.0;
                    }

                    self.vel += dir * a * (velocity * 0.75);
                    self.vel *= 0.85;
                }

                // handle hook influence
                if self.hook_enabled
                    && self.hooked_player == Some(i)
                    && tuning.player_hooking != 0.0
                    && dist > physical_size() * 1.50
                {
                    let hook_accel = tuning.hook_drag_accel * (dist / tuning.hook_length);
                    let drag_speed = tuning.hook_drag_speed;

                    // add force to the hooked character
                    let temp = vec2::new(
                        Self::saturated_add(
                            -drag_speed,
                            drag_speed,
                            other.vel.x,
                            hook_accel * dir.x * 1.5,
                        ),
                        Self::saturated_add(
                            -drag_speed,
                            drag_speed,
                            other.vel.y,
                            hook_accel * dir.y * 1.5,
                        ),
                    );
                    other.vel = clamp_vel(other.tiles.move_restrictions(), &temp);

                    // add a little bit force to the guy who has the grip
                    let temp = vec2::new(
                        Self::saturated_add(
                            -drag_speed,
                            drag_speed,
                            self.vel.x,
                            -hook_accel * dir.x * 0.25,
                        ),
                        Self::saturated_add(
                            -drag_speed,
                            drag_speed,
                            self.vel.y,
                            -hook_accel * dir.y * 0.25,
                        ),
                    );
                    self.vel = clamp_vel(self.tiles.move_restrictions(), &temp);
                }
            }
        }

        /// Moves the character by its velocity through the map and stops
        /// it in front of other characters.
        pub fn physics_move(&mut self, pipe: &mut CorePipe) {
            let tuning = pipe.tuning;
            let ramp_value = Self::velocity_ramp(
                length(&self.vel) * 50.0,
                tuning.velramp_start,
                tuning.velramp_range,
                tuning.velramp_curvature,
            );

            self.vel.x *= ramp_value;

            let mut new_pos = self.pos;
            pipe.collision
                .move_box(&mut new_pos, &mut self.vel, &physical_size_vec2(), 0.0);

            self.vel.x *= 1.0 / ramp_value;

            if tuning.player_collision != 0.0 && self.collision_enabled {
                // check character collision
                let distance_pos = distance(&self.pos, &new_pos);
                if distance_pos > 0.0 {
                    let end = (distance_pos + 1.0) as i32;
                    let mut last_pos = self.pos;
                    for i in 0..end {
                        let a = i as f32 / distance_pos;
                        let pos = mix(&self.pos, &new_pos, a);
                        for (p, other) in pipe.characters.iter().enumerate() {
                            let Some(other) = other else {
                                continue;
                            };
                            if !self.is_other(p)
                                || self.id.is_some_and(|id| !pipe.teams.can_collide(id, p))
                                || !other.collision_enabled
                            {
                                continue;
                            }
                            let d = distance(&pos, &other.pos);
                            if d < physical_size() {
                                if a > 0.0 {
                                    self.pos = last_pos;
                                } else if distance(&new_pos, &other.pos) > d {
                                    self.pos = new_pos;
                                }
                                return;
                            }
                        }
                        last_pos = pos;
                    }
                }
            }

            self.pos = new_pos;
        }

        pub fn physics_write(&self, net_core: &mut NetObjCharacterCore) {
            net_core.x = round_to_int(self.pos.x);
            net_core.y = round_to_int(self.pos.y);

            net_core.vel_x = round_to_int(self.vel.x * 256.0);
            net_core.vel_y = round_to_int(self.vel.y * 256.0);
            net_core.hook_state = self.hook_state.to_net();
            net_core.hook_tick = self.hook_tick;
            net_core.hook_x = round_to_int(self.hook_pos.x);
            net_core.hook_y = round_to_int(self.hook_pos.y);
            net_core.hook_dx = round_to_int(self.hook_dir.x * 256.0);
            net_core.hook_dy = round_to_int(self.hook_dir.y * 256.0);
            net_core.hooked_player = self
                .hooked_player
                .and_then(|id| i32::try_from(id).ok())
                .unwrap_or(-1);
            net_core.jumped = self.jumped;
            net_core.direction = self.direction;
            net_core.angle = self.angle;
        }

        pub fn physics_read(&mut self, net_core: &NetObjCharacterCore) {
            self.pos.x = net_core.x as f32;
            self.pos.y = net_core.y as f32;
            self.vel.x = net_core.vel_x as f32 / 256.0;
            self.vel.y = net_core.vel_y as f32 / 256.0;
            self.hook_state = HookState::from_net(net_core.hook_state);
            self.hook_tick = net_core.hook_tick;
            self.hook_pos.x = net_core.hook_x as f32;
            self.hook_pos.y = net_core.hook_y as f32;
            self.hook_dir.x = net_core.hook_dx as f32 / 256.0;
            self.hook_dir.y = net_core.hook_dy as f32 / 256.0;
            self.hooked_player = usize::try_from(net_core.hooked_player)
                .ok()
                .filter(|id| *id < MAX_CLIENTS);
            self.jumped = net_core.jumped;
            self.direction = net_core.direction;
            self.angle = net_core.angle;
        }

        /// Forces the state onto the grid the network can represent.
        pub fn physics_quantize(&mut self) {
            let mut net_core = NetObjCharacterCore::default();
            self.physics_write(&mut net_core);
            self.physics_read(&net_core);
        }

        pub fn net_core(&self) -> NetObjCharacterCore {
            let mut net_core = NetObjCharacterCore::default();
            self.physics_write(&mut net_core);
            net_core
        }
    }

}
