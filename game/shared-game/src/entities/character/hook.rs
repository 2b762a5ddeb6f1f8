pub mod character_hook {
    use num_derive::FromPrimitive;
    use num_traits::FromPrimitive;
    use serde::{Deserialize, Serialize};

    #[derive(
        Debug,
        Default,
        Clone,
        Copy,
        Serialize,
        Deserialize,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        FromPrimitive,
    )]
    #[repr(i32)]
    pub enum HookState {
        /// the hook went back into the character, waits for the button to be released
        Retracted = -1,
        /// the hook button is not pressed
        #[default]
        Idle = 0,
        /// the hook did not attach to anything and goes into the character again
        RetractStart = 1,
        Retracting = 2,
        /// like [HookState::RetractStart] but two ticks later
        RetractEnd = 3,
        /// the hook is currently flying
        Flying = 4,
        /// the hook is currently attached to something (player or ground)
        Grabbed = 5,
    }

    impl HookState {
        /// The state as sent over the network.
        pub fn to_net(self) -> i32 {
            self as i32
        }

        /// Unknown values are treated as [`HookState::Retracted`],
        /// which waits for the hook button to be released.
        pub fn from_net(state: i32) -> Self {
            Self::from_i32(state).unwrap_or(Self::Retracted)
        }

        pub fn is_retracting(&self) -> bool {
            *self >= Self::RetractStart && *self <= Self::RetractEnd
        }

        /// The next state of the retract animation, [`HookState::RetractEnd`]
        /// stays as it is.
        pub fn next_retract(self) -> Self {
            match self {
                Self::RetractStart => Self::Retracting,
                Self::Retracting => Self::RetractEnd,
                state => state,
            }
        }
    }

    #[cfg(test)]
    mod test {
        use super::HookState;

        #[test]
        fn net_values() {
            for state in [
                HookState::Retracted,
                HookState::Idle,
                HookState::RetractStart,
                HookState::Retracting,
                HookState::RetractEnd,
                HookState::Flying,
                HookState::Grabbed,
            ] {
                assert_eq!(HookState::from_net(state.to_net()), state);
            }
            assert_eq!(HookState::Grabbed.to_net(), 5);
            assert_eq!(HookState::from_net(42), HookState::Retracted);
            assert_eq!(HookState::from_net(-7), HookState::Retracted);
        }

        #[test]
        fn retract_animation() {
            let mut state = HookState::RetractStart;
            let mut ticks = 0;
            while state != HookState::RetractEnd {
                assert!(state.is_retracting());
                state = state.next_retract();
                ticks += 1;
            }
            assert_eq!(ticks, 2);
            assert!(!HookState::Flying.is_retracting());
            assert!(!HookState::Retracted.is_retracting());
        }
    }
}
