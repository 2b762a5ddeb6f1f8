pub mod character_tiles {
    use math::math::vector::vec2;
    use shared_base::mapdef_06::{DdraceTileNum, ROTATION_0, ROTATION_180, ROTATION_270, ROTATION_90};

    use crate::collision::collision::Collision;

    /// Distance of the probe points from the character's center.
    const PROBE_OFFSET: f32 = 28.0 / 2.0 + 4.0;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(i32)]
    pub enum CannotMove {
        Left = 1 << 0,
        Right = 1 << 1,
        Up = 1 << 2,
        Down = 1 << 3,
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct TileProbe {
        pub index: u8,
        pub flags: u8,
    }

    impl TileProbe {
        fn is(&self, index: DdraceTileNum) -> bool {
            self.index == index as u8
        }
    }

    /// The tiles of one layer at the center and the four probe points.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct LayerProbes {
        pub center: TileProbe,
        /// `x + 18`
        pub right: TileProbe,
        /// `x - 18`
        pub left: TileProbe,
        /// `y - 18`
        pub up: TileProbe,
        /// `y + 18`
        pub down: TileProbe,
    }

    impl LayerProbes {
        fn sample(indices: &ProbeIndices, probe: impl Fn(usize) -> TileProbe) -> Self {
            Self {
                center: probe(indices.center),
                right: probe(indices.right),
                left: probe(indices.left),
                up: probe(indices.up),
                down: probe(indices.down),
            }
        }

        /// A stopper blocks if the center is a `STOP` with the given rotation,
        /// or the probe in moving direction is such a `STOP`, a two sided
        /// `STOPS` on that axis or a `STOPA`.
        fn blocks(
            &self,
            probe: &TileProbe,
            stop_rotation: u8,
            stops_rotations: [u8; 2],
        ) -> bool {
            (self.center.is(DdraceTileNum::Stop) && self.center.flags == stop_rotation)
                || (probe.is(DdraceTileNum::Stop) && probe.flags == stop_rotation)
                || (probe.is(DdraceTileNum::StopS) && stops_rotations.contains(&probe.flags))
                || probe.is(DdraceTileNum::StopA)
        }

        fn move_restrictions(&self) -> i32 {
            let mut res = 0;
            if self.blocks(&self.right, ROTATION_270, [ROTATION_90, ROTATION_270]) {
                res |= CannotMove::Right as i32;
            }
            if self.blocks(&self.left, ROTATION_90, [ROTATION_90, ROTATION_270]) {
                res |= CannotMove::Left as i32;
            }
            if self.blocks(&self.up, ROTATION_180, [ROTATION_0, ROTATION_180]) {
                res |= CannotMove::Up as i32;
            }
            if self.blocks(&self.down, ROTATION_0, [ROTATION_0, ROTATION_180]) {
                res |= CannotMove::Down as i32;
            }
            res
        }
    }

    struct ProbeIndices {
        center: usize,
        right: usize,
        left: usize,
        up: usize,
        down: usize,
    }

    /// The tiles a character stands on, cached once per tick.
    ///
    /// Other characters read these when they drag this character with
    /// their hook.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct CharacterTiles {
        pub game: LayerProbes,
        pub front: LayerProbes,
        pub switch: LayerProbes,
    }

    impl CharacterTiles {
        /// `switch_active` decides per map index if the switch layer
        /// applies to this character.
        pub fn sample(
            collision: &Collision,
            pos: &vec2,
            switch_active: impl Fn(usize) -> bool,
        ) -> Self {
            let indices = ProbeIndices {
                center: collision.get_pure_map_index(pos),
                right: collision.get_pure_map_index(&vec2::new(pos.x + PROBE_OFFSET, pos.y)),
                left: collision.get_pure_map_index(&vec2::new(pos.x - PROBE_OFFSET, pos.y)),
                up: collision.get_pure_map_index(&vec2::new(pos.x, pos.y - PROBE_OFFSET)),
                down: collision.get_pure_map_index(&vec2::new(pos.x, pos.y + PROBE_OFFSET)),
            };
            Self {
                game: LayerProbes::sample(&indices, |index| TileProbe {
                    index: collision.get_tile_index(index),
                    flags: collision.get_tile_flags(index),
                }),
                front: LayerProbes::sample(&indices, |index| TileProbe {
                    index: collision.get_f_tile_index(index),
                    flags: collision.get_f_tile_flags(index),
                }),
                switch: LayerProbes::sample(&indices, |index| {
                    if switch_active(index) {
                        TileProbe {
                            index: collision.get_d_tile_index(index),
                            flags: collision.get_d_tile_flags(index),
                        }
                    } else {
                        TileProbe::default()
                    }
                }),
            }
        }

        /// Bit set of [`CannotMove`] over all layers.
        pub fn move_restrictions(&self) -> i32 {
            self.game.move_restrictions()
                | self.front.move_restrictions()
                | self.switch.move_restrictions()
        }
    }

    /// Zeroes every velocity component that points into a blocked direction.
    pub fn clamp_vel(move_restriction: i32, vel_param: &vec2) -> vec2 {
        let mut vel = *vel_param;
        if vel.x > 0.0 && (move_restriction & CannotMove::Right as i32) != 0 {
            vel.x = 0.0;
        }
        if vel.x < 0.0 && (move_restriction & CannotMove::Left as i32) != 0 {
            vel.x = 0.0;
        }
        if vel.y > 0.0 && (move_restriction & CannotMove::Down as i32) != 0 {
            vel.y = 0.0;
        }
        if vel.y < 0.0 && (move_restriction & CannotMove::Up as i32) != 0 {
            vel.y = 0.0;
        }
        vel
    }

    #[cfg(test)]
    mod test {
        use math::math::vector::vec2;
        use shared_base::mapdef_06::{
            DdraceTileNum, SwitchTile, Tile, ROTATION_0, ROTATION_180, ROTATION_270, ROTATION_90,
        };

        use crate::collision::collision::Collision;

        use super::{clamp_vel, CannotMove, CharacterTiles};

        const W: u32 = 8;

        fn map(tiles: &[(u32, u32, DdraceTileNum, u8)]) -> Collision {
            let mut layer = vec![Tile::default(); (W * W) as usize];
            for (x, y, index, flags) in tiles {
                layer[(y * W + x) as usize] = Tile::new(*index, *flags);
            }
            Collision::new(W, W, layer).unwrap()
        }

        // character center in tile (3, 3)
        const POS: vec2 = vec2::new(112.0, 112.0);

        #[test]
        fn probes_are_geometric() {
            let collision = map(&[
                (4, 3, DdraceTileNum::StopA, 0),
                (2, 3, DdraceTileNum::Stop, ROTATION_90),
                (3, 2, DdraceTileNum::StopS, ROTATION_180),
                (3, 4, DdraceTileNum::Stop, ROTATION_0),
            ]);
            let tiles = CharacterTiles::sample(&collision, &POS, |_| false);
            assert_eq!(tiles.game.right.index, DdraceTileNum::StopA as u8);
            assert_eq!(tiles.game.left.flags, ROTATION_90);
            assert_eq!(tiles.game.up.index, DdraceTileNum::StopS as u8);
            assert_eq!(tiles.game.down.index, DdraceTileNum::Stop as u8);
            assert_eq!(
                tiles.move_restrictions(),
                CannotMove::Right as i32
                    | CannotMove::Left as i32
                    | CannotMove::Up as i32
                    | CannotMove::Down as i32
            );
        }

        #[test]
        fn stopper_rotation_must_match() {
            // a STOP on the right probe only blocks with rotation 270
            let collision = map(&[(4, 3, DdraceTileNum::Stop, ROTATION_90)]);
            let tiles = CharacterTiles::sample(&collision, &POS, |_| false);
            assert_eq!(tiles.move_restrictions(), 0);

            let collision = map(&[(4, 3, DdraceTileNum::Stop, ROTATION_270)]);
            let tiles = CharacterTiles::sample(&collision, &POS, |_| false);
            assert_eq!(tiles.move_restrictions(), CannotMove::Right as i32);
        }

        #[test]
        fn center_stopper() {
            let collision = map(&[(3, 3, DdraceTileNum::Stop, ROTATION_180)]);
            let tiles = CharacterTiles::sample(&collision, &POS, |_| false);
            assert_eq!(tiles.move_restrictions(), CannotMove::Up as i32);
        }

        #[test]
        fn switch_layer_is_gated() {
            let mut collision = Collision::empty(W, W).unwrap();
            let mut switch = vec![SwitchTile::default(); (W * W) as usize];
            switch[(3 * W + 4) as usize] = SwitchTile::new(DdraceTileNum::StopA, 0, 1);
            collision.set_switch_layer(switch).unwrap();

            let tiles = CharacterTiles::sample(&collision, &POS, |_| false);
            assert_eq!(tiles.move_restrictions(), 0);
            let tiles = CharacterTiles::sample(&collision, &POS, |_| true);
            assert_eq!(tiles.move_restrictions(), CannotMove::Right as i32);
        }

        #[test]
        fn clamp_only_blocked_directions() {
            let restriction = CannotMove::Right as i32 | CannotMove::Up as i32;
            assert_eq!(
                clamp_vel(restriction, &vec2::new(3.0, -2.0)),
                vec2::new(0.0, 0.0)
            );
            assert_eq!(
                clamp_vel(restriction, &vec2::new(-3.0, 2.0)),
                vec2::new(-3.0, 2.0)
            );
            assert_eq!(clamp_vel(0, &vec2::new(3.0, -2.0)), vec2::new(3.0, -2.0));
        }
    }
}
