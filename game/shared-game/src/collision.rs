pub mod collision {
    use std::collections::BTreeMap;

    use game_interface::types::game::MAX_CLIENTS;
    use shared_base::mapdef_06::{
        CollisionFlags, DdraceTileNum, SwitchTile, TeleTile, Tile, ROTATION_0, ROTATION_180,
        ROTATION_270, ROTATION_90,
    };
    use thiserror::Error;

    use math::math::{distance, mix, round_to_int, vector::vec2};

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum CollisionError {
        #[error("map must be at least one tile wide and high, got {width}x{height}")]
        ZeroSized { width: u32, height: u32 },
        #[error("{layer} layer has {got} tiles, but the map needs {expected}")]
        LayerSizeMismatch {
            layer: &'static str,
            expected: usize,
            got: usize,
        },
    }

    /// The state of a single switch number, one entry per team.
    #[derive(Debug, Clone)]
    pub struct Switcher {
        status: Vec<bool>,
    }

    impl Default for Switcher {
        fn default() -> Self {
            // switches start open for every team, including the super team
            Self {
                status: vec![true; MAX_CLIENTS + 1],
            }
        }
    }

    /// All switch numbers of a map.
    #[derive(Debug, Clone, Default)]
    pub struct Switchers {
        switchers: Vec<Switcher>,
    }

    impl Switchers {
        /// Creates the switchers `0..=highest_number`.
        pub fn new(highest_number: u8) -> Self {
            Self {
                switchers: vec![Switcher::default(); highest_number as usize + 1],
            }
        }

        pub fn len(&self) -> usize {
            self.switchers.len()
        }

        pub fn is_empty(&self) -> bool {
            self.switchers.is_empty()
        }

        /// Unknown switch numbers or teams are never open.
        pub fn status(&self, number: u8, team: usize) -> bool {
            self.switchers
                .get(number as usize)
                .and_then(|switcher| switcher.status.get(team))
                .copied()
                .unwrap_or(false)
        }

        /// Returns `false` if the switch number or team does not exist.
        pub fn set_status(&mut self, number: u8, team: usize, open: bool) -> bool {
            match self
                .switchers
                .get_mut(number as usize)
                .and_then(|switcher| switcher.status.get_mut(team))
            {
                Some(status) => {
                    *status = open;
                    true
                }
                None => false,
            }
        }
    }

    /// The collision view of a map: the game layer and the optional
    /// front, switch and tele layers, all of the same size.
    #[derive(Debug, Clone)]
    pub struct Collision {
        tiles: Vec<Tile>,
        front: Option<Vec<Tile>>,
        switch: Option<Vec<SwitchTile>>,
        tele: Option<Vec<TeleTile>>,
        switchers: Option<Switchers>,
        width: u32,
        height: u32,
    }

    impl Collision {
        pub fn new(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, CollisionError> {
            if width == 0 || height == 0 {
                return Err(CollisionError::ZeroSized { width, height });
            }
            let res = Self {
                tiles: Vec::new(),
                front: None,
                switch: None,
                tele: None,
                switchers: None,
                width,
                height,
            };
            res.check_layer_size("game", tiles.len())?;
            Ok(Self { tiles, ..res })
        }

        /// A map where every tile is air.
        pub fn empty(width: u32, height: u32) -> Result<Self, CollisionError> {
            Self::new(
                width,
                height,
                vec![Tile::default(); width as usize * height as usize],
            )
        }

        fn check_layer_size(&self, layer: &'static str, got: usize) -> Result<(), CollisionError> {
            let expected = self.width as usize * self.height as usize;
            if got != expected {
                return Err(CollisionError::LayerSizeMismatch {
                    layer,
                    expected,
                    got,
                });
            }
            Ok(())
        }

        pub fn set_front_layer(&mut self, front: Vec<Tile>) -> Result<(), CollisionError> {
            self.check_layer_size("front", front.len())?;
            self.front = Some(front);
            Ok(())
        }

        /// Also (re)creates the switchers, one per switch number used
        /// by the layer.
        pub fn set_switch_layer(&mut self, switch: Vec<SwitchTile>) -> Result<(), CollisionError> {
            self.check_layer_size("switch", switch.len())?;
            let highest_number = switch.iter().map(|tile| tile.number).max().unwrap_or(0);
            self.switchers = (highest_number > 0).then(|| Switchers::new(highest_number));
            self.switch = Some(switch);
            Ok(())
        }

        pub fn set_tele_layer(&mut self, tele: Vec<TeleTile>) -> Result<(), CollisionError> {
            self.check_layer_size("tele", tele.len())?;
            self.tele = Some(tele);
            Ok(())
        }

        pub fn get_playfield_width(&self) -> u32 {
            self.width
        }

        pub fn get_playfield_height(&self) -> u32 {
            self.height
        }

        pub fn switchers(&self) -> Option<&Switchers> {
            self.switchers.as_ref()
        }

        pub fn switchers_mut(&mut self) -> Option<&mut Switchers> {
            self.switchers.as_mut()
        }

        /// Index of the tile at the given world position, clamped to the map.
        pub fn get_pure_map_index(&self, pos: &vec2) -> usize {
            self.get_pure_map_index_int(round_to_int(pos.x), round_to_int(pos.y))
        }

        fn get_pure_map_index_int(&self, x: i32, y: i32) -> usize {
            let nx = (x / 32).clamp(0, self.width as i32 - 1);
            let ny = (y / 32).clamp(0, self.height as i32 - 1);
            (ny * self.width as i32 + nx) as usize
        }

        /// Collision relevant index of the game layer at a point.
        fn get_tile(&self, x: i32, y: i32) -> u8 {
            let index = self.tiles[self.get_pure_map_index_int(x, y)].index;
            if index >= DdraceTileNum::Solid as u8 && index <= DdraceTileNum::NoLaser as u8 {
                index
            } else {
                0
            }
        }

        fn is_solid(&self, x: i32, y: i32) -> bool {
            let index = self.get_tile(x, y);
            index == DdraceTileNum::Solid as u8 || index == DdraceTileNum::NoHook as u8
        }

        pub fn check_point(&self, x: f32, y: f32) -> bool {
            self.is_solid(round_to_int(x), round_to_int(y))
        }

        pub fn get_collision_at(&self, x: f32, y: f32) -> CollisionFlags {
            match self.get_tile(round_to_int(x), round_to_int(y)) {
                i if i == DdraceTileNum::Solid as u8 => CollisionFlags::SOLID,
                i if i == DdraceTileNum::NoHook as u8 => {
                    CollisionFlags::SOLID | CollisionFlags::NOHOOK
                }
                i if i == DdraceTileNum::Death as u8 => CollisionFlags::DEATH,
                _ => CollisionFlags::empty(),
            }
        }

        pub fn get_tile_index(&self, index: usize) -> u8 {
            self.tiles.get(index).map(|tile| tile.index).unwrap_or(0)
        }

        pub fn get_tile_flags(&self, index: usize) -> u8 {
            self.tiles.get(index).map(|tile| tile.flags).unwrap_or(0)
        }

        pub fn get_f_tile_index(&self, index: usize) -> u8 {
            self.front
                .as_ref()
                .and_then(|front| front.get(index))
                .map(|tile| tile.index)
                .unwrap_or(0)
        }

        pub fn get_f_tile_flags(&self, index: usize) -> u8 {
            self.front
                .as_ref()
                .and_then(|front| front.get(index))
                .map(|tile| tile.flags)
                .unwrap_or(0)
        }

        fn get_switch_tile(&self, index: usize) -> Option<&SwitchTile> {
            self.switch.as_ref().and_then(|switch| switch.get(index))
        }

        pub fn get_d_tile_index(&self, index: usize) -> u8 {
            self.get_switch_tile(index)
                .map(|tile| tile.tile_type)
                .unwrap_or(0)
        }

        pub fn get_d_tile_flags(&self, index: usize) -> u8 {
            self.get_switch_tile(index)
                .filter(|tile| tile.tile_type != 0)
                .map(|tile| tile.flags)
                .unwrap_or(0)
        }

        pub fn get_d_tile_number(&self, index: usize) -> u8 {
            self.get_switch_tile(index)
                .filter(|tile| tile.tile_type != 0)
                .map(|tile| tile.number)
                .unwrap_or(0)
        }

        /// Tele number of a hook teleporter, `0` if there is none.
        fn is_teleport_hook(&self, index: usize) -> u8 {
            self.tele
                .as_ref()
                .and_then(|tele| tele.get(index))
                .filter(|tile| tile.tile_type == DdraceTileNum::TeleInHook as u8)
                .map(|tile| tile.number)
                .unwrap_or(0)
        }

        pub fn test_box(&self, pos: &vec2, size_param: &vec2) -> bool {
            let mut size = *size_param;
            size *= 0.5;
            self.check_point(pos.x - size.x, pos.y - size.y)
                || self.check_point(pos.x + size.x, pos.y - size.y)
                || self.check_point(pos.x - size.x, pos.y + size.y)
                || self.check_point(pos.x + size.x, pos.y + size.y)
        }

        pub fn move_box(
            &self,
            in_out_pos: &mut vec2,
            in_out_vel: &mut vec2,
            size: &vec2,
            elasticity: f32,
        ) {
            let mut pos = *in_out_pos;
            let mut vel = *in_out_vel;

            let vel_distance = math::math::length(&vel);
            let max = vel_distance as i32;

            if vel_distance > 0.00001 {
                let fraction = 1.0 / max.saturating_add(1) as f32;
                for _ in 0..=max {
                    // nothing left to move
                    if vel == vec2::new(0.0, 0.0) {
                        break;
                    }

                    let mut new_pos = pos + vel * fraction;

                    // the step is too small to change the position
                    if new_pos == pos {
                        break;
                    }

                    if self.test_box(&new_pos, size) {
                        let mut hits = 0;

                        if self.test_box(&vec2::new(pos.x, new_pos.y), size) {
                            new_pos.y = pos.y;
                            vel.y *= -elasticity;
                            hits += 1;
                        }

                        if self.test_box(&vec2::new(new_pos.x, pos.y), size) {
                            new_pos.x = pos.x;
                            vel.x *= -elasticity;
                            hits += 1;
                        }

                        // corner case, only the diagonal collides
                        if hits == 0 {
                            new_pos.y = pos.y;
                            vel.y *= -elasticity;
                            new_pos.x = pos.x;
                            vel.x *= -elasticity;
                        }
                    }

                    pos = new_pos;
                }
            }

            *in_out_pos = pos;
            *in_out_vel = vel;
        }

        /// Offset to the neighbour tile that decides if a "through" tile
        /// lets the line pass.
        fn through_offset(pos0: &vec2, pos1: &vec2) -> (i32, i32) {
            let x = pos0.x - pos1.x;
            let y = pos0.y - pos1.y;
            if x.abs() > y.abs() {
                if x < 0.0 {
                    (-32, 0)
                } else {
                    (32, 0)
                }
            } else if y < 0.0 {
                (0, -32)
            } else {
                (0, 32)
            }
        }

        fn is_rotated_through(flags: u8, pos0: &vec2, pos1: &vec2) -> bool {
            (flags == ROTATION_0 && pos0.y > pos1.y)
                || (flags == ROTATION_90 && pos0.x < pos1.x)
                || (flags == ROTATION_180 && pos0.y < pos1.y)
                || (flags == ROTATION_270 && pos0.x > pos1.x)
        }

        fn is_rotated_blocker(flags: u8, pos0: &vec2, pos1: &vec2) -> bool {
            (flags == ROTATION_0 && pos0.y < pos1.y)
                || (flags == ROTATION_90 && pos0.x > pos1.x)
                || (flags == ROTATION_180 && pos0.y > pos1.y)
                || (flags == ROTATION_270 && pos0.x < pos1.x)
        }

        fn is_through(
            &self,
            x: i32,
            y: i32,
            (xoff, yoff): (i32, i32),
            pos0: &vec2,
            pos1: &vec2,
        ) -> bool {
            let pos = self.get_pure_map_index_int(x, y);
            if let Some(front) = &self.front {
                let tile = &front[pos];
                if tile.index == DdraceTileNum::ThroughAll as u8
                    || tile.index == DdraceTileNum::ThroughCut as u8
                {
                    return true;
                }
                if tile.index == DdraceTileNum::ThroughDir as u8
                    && Self::is_rotated_through(tile.flags, pos0, pos1)
                {
                    return true;
                }
            }
            let offpos = self.get_pure_map_index_int(x + xoff, y + yoff);
            self.tiles[offpos].index == DdraceTileNum::Through as u8
                || self
                    .front
                    .as_ref()
                    .is_some_and(|front| front[offpos].index == DdraceTileNum::Through as u8)
        }

        fn is_hook_blocker(&self, x: i32, y: i32, pos0: &vec2, pos1: &vec2) -> bool {
            let pos = self.get_pure_map_index_int(x, y);
            let blocks = |tile: &Tile| {
                tile.index == DdraceTileNum::ThroughAll as u8
                    || (tile.index == DdraceTileNum::ThroughDir as u8
                        && Self::is_rotated_blocker(tile.flags, pos0, pos1))
            };
            blocks(&self.tiles[pos]) || self.front.as_ref().is_some_and(|front| blocks(&front[pos]))
        }

        /// Walks the line and reports the first solid point.
        pub fn intersect_line(
            &self,
            pos0: &vec2,
            pos1: &vec2,
            out_collision: &mut vec2,
            out_before_collision: &mut vec2,
        ) -> CollisionFlags {
            let distance = distance(pos0, pos1);
            let end = (distance + 1.0) as i32;
            let mut last = *pos0;
            for i in 0..=end {
                let a = i as f32 / end as f32;
                let pos = mix(pos0, pos1, a);
                if self.check_point(pos.x, pos.y) {
                    *out_collision = pos;
                    *out_before_collision = last;
                    return self.get_collision_at(pos.x, pos.y);
                }
                last = pos;
            }
            *out_collision = *pos1;
            *out_before_collision = *pos1;
            CollisionFlags::empty()
        }

        /// Like [`Collision::intersect_line`], but honors "through" tiles and
        /// hook blockers and stops at hook teleporters.
        ///
        /// A teleporter hit returns [`CollisionFlags::TELE`] and writes its
        /// number to `tele_nr`, otherwise `tele_nr` is `0`.
        pub fn intersect_line_tele_hook(
            &self,
            pos0: &vec2,
            pos1: &vec2,
            out_collision: &mut vec2,
            out_before_collision: &mut vec2,
            tele_nr: &mut u8,
        ) -> CollisionFlags {
            let distance = distance(pos0, pos1);
            let end = (distance + 1.0) as i32;
            let mut last = *pos0;
            let through_offset = Self::through_offset(pos0, pos1);
            for i in 0..=end {
                let a = i as f32 / end as f32;
                let pos = mix(pos0, pos1, a);
                let ix = round_to_int(pos.x);
                let iy = round_to_int(pos.y);

                *tele_nr = self.is_teleport_hook(self.get_pure_map_index(&pos));
                if *tele_nr > 0 {
                    *out_collision = pos;
                    *out_before_collision = last;
                    return CollisionFlags::TELE;
                }

                let mut hit = CollisionFlags::empty();
                if self.check_point(ix as f32, iy as f32) {
                    if !self.is_through(ix, iy, through_offset, pos0, pos1) {
                        hit = self.get_collision_at(ix as f32, iy as f32);
                    }
                } else if self.is_hook_blocker(ix, iy, pos0, pos1) {
                    hit = CollisionFlags::SOLID | CollisionFlags::NOHOOK;
                }
                if !hit.is_empty() {
                    *out_collision = pos;
                    *out_before_collision = last;
                    return hit;
                }

                last = pos;
            }
            *out_collision = *pos1;
            *out_before_collision = *pos1;
            CollisionFlags::empty()
        }

        /// Centers of all teleport-out tiles, grouped by tele number and
        /// ordered by map index.
        pub fn tele_outs(&self) -> BTreeMap<u8, Vec<vec2>> {
            let mut res: BTreeMap<u8, Vec<vec2>> = BTreeMap::new();
            let Some(tele) = &self.tele else {
                return res;
            };
            for (index, tile) in tele.iter().enumerate() {
                if tile.tile_type == DdraceTileNum::TeleOut as u8 && tile.number > 0 {
                    let x = (index % self.width as usize) as f32;
                    let y = (index / self.width as usize) as f32;
                    res.entry(tile.number)
                        .or_default()
                        .push(vec2::new(x * 32.0 + 16.0, y * 32.0 + 16.0));
                }
            }
            res
        }
    }

}
