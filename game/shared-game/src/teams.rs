pub mod teams {
    use game_interface::types::game::{CharacterId, MAX_CLIENTS, VANILLA_MAX_CLIENTS};

    /// The team of every character slot.
    #[derive(Debug, Clone)]
    pub struct TeamsCore {
        teams: Vec<usize>,
        is_ddrace16: bool,
    }

    impl Default for TeamsCore {
        fn default() -> Self {
            Self::new(false)
        }
    }

    impl TeamsCore {
        /// All characters start in team 0.
        pub fn new(is_ddrace16: bool) -> Self {
            Self {
                teams: vec![0; MAX_CLIENTS],
                is_ddrace16,
            }
        }

        pub fn is_ddrace16(&self) -> bool {
            self.is_ddrace16
        }

        /// Characters of this team collide with everyone and
        /// ignore switch states.
        pub fn super_team(&self) -> usize {
            if self.is_ddrace16 {
                VANILLA_MAX_CLIENTS
            } else {
                MAX_CLIENTS
            }
        }

        pub fn team(&self, id: CharacterId) -> Option<usize> {
            self.teams.get(id).copied()
        }

        /// Returns `false` for an unknown character or a team beyond the super team.
        pub fn set_team(&mut self, id: CharacterId, team: usize) -> bool {
            if team > self.super_team() {
                return false;
            }
            match self.teams.get_mut(id) {
                Some(entry) => {
                    *entry = team;
                    true
                }
                None => false,
            }
        }

        pub fn reset(&mut self) {
            self.teams.iter_mut().for_each(|team| *team = 0);
        }

        /// Unknown characters never collide.
        pub fn can_collide(&self, id1: CharacterId, id2: CharacterId) -> bool {
            let (Some(team1), Some(team2)) = (self.team(id1), self.team(id2)) else {
                return false;
            };
            let super_team = self.super_team();
            team1 == super_team || team2 == super_team || team1 == team2
        }
    }

    #[cfg(test)]
    mod test {
        use game_interface::types::game::{MAX_CLIENTS, VANILLA_MAX_CLIENTS};

        use super::TeamsCore;

        #[test]
        fn same_team_collides() {
            let mut teams = TeamsCore::default();
            assert!(teams.can_collide(0, 1));
            assert!(teams.set_team(1, 3));
            assert!(!teams.can_collide(0, 1));
            assert!(teams.set_team(0, 3));
            assert!(teams.can_collide(0, 1));
        }

        #[test]
        fn super_team_collides_with_everyone() {
            let mut teams = TeamsCore::new(false);
            assert_eq!(teams.super_team(), MAX_CLIENTS);
            teams.set_team(0, 5);
            teams.set_team(1, MAX_CLIENTS);
            assert!(teams.can_collide(0, 1));
            assert!(teams.can_collide(1, 0));

            let teams = TeamsCore::new(true);
            assert_eq!(teams.super_team(), VANILLA_MAX_CLIENTS);
        }

        #[test]
        fn out_of_range_fails_closed() {
            let mut teams = TeamsCore::default();
            assert!(!teams.can_collide(0, MAX_CLIENTS));
            assert!(!teams.can_collide(usize::MAX, 0));
            assert_eq!(teams.team(MAX_CLIENTS), None);
            assert!(!teams.set_team(MAX_CLIENTS, 0));
            assert!(!teams.set_team(0, MAX_CLIENTS + 1));
        }

        #[test]
        fn reset_moves_everyone_to_team_0() {
            let mut teams = TeamsCore::default();
            teams.set_team(0, 2);
            teams.set_team(5, 7);
            assert!(!teams.can_collide(0, 5));
            teams.reset();
            assert_eq!(teams.team(0), Some(0));
            assert_eq!(teams.team(5), Some(0));
            assert!(teams.can_collide(0, 5));
        }
    }
}
