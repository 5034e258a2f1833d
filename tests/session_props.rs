use dinput_joystick::backends::virtual_input::VirtualJoystick;
use dinput_joystick::{DeviceSession, JoyState, NativeError, SessionOptions};
use proptest::prelude::*;

fn open(joy: &VirtualJoystick) -> DeviceSession {
    DeviceSession::open(joy.instance(), joy.device(), SessionOptions::default())
}

fn joy_state() -> impl Strategy<Value = JoyState> {
    (
        prop::array::uniform8(any::<i32>()),
        prop::array::uniform4(prop_oneof![Just(u32::MAX), 0u32..36_000]),
        prop::collection::vec(prop_oneof![Just(0u8), Just(0x80u8)], JoyState::BUTTONS),
    )
        .prop_map(|(axes, povs, buttons)| {
            let mut state = JoyState {
                axes,
                povs,
                ..JoyState::ZERO
            };
            state.buttons.copy_from_slice(&buttons);
            state
        })
}

fn fault() -> impl Strategy<Value = NativeError> {
    prop_oneof![
        Just(NativeError::InputLost),
        Just(NativeError::NotAcquired),
        Just(NativeError::OtherAppHasPriority),
        Just(NativeError::Pending),
        Just(NativeError::NotInitialized),
        Just(NativeError::InvalidParam),
        any::<u32>().prop_map(NativeError::Other),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn failed_poll_leaves_both_buffers_identical(
        first in joy_state(),
        pending in joy_state(),
        fault in fault(),
        at_read in any::<bool>(),
    ) {
        let joy = VirtualJoystick::new("Prop").with_capabilities(8, 128, 4);
        let mut session = open(&joy);
        joy.set_state(first);
        session.poll().unwrap();
        let before = *session.buffers();

        joy.set_state(pending);
        if at_read {
            joy.fail_next_read(fault);
        } else {
            joy.fail_next_poll(fault);
        }
        prop_assert!(session.poll().is_err());
        prop_assert_eq!(session.buffers(), &before);
    }

    #[test]
    fn successful_poll_shifts_current_into_previous(a in joy_state(), b in joy_state()) {
        let joy = VirtualJoystick::new("Prop");
        let mut session = open(&joy);
        joy.set_state(a);
        session.poll().unwrap();
        joy.set_state(b);
        session.poll().unwrap();
        prop_assert_eq!(session.buffers().previous(), &a);
        prop_assert_eq!(session.buffers().current(), &b);
    }

    #[test]
    fn accessors_are_neutral_beyond_capabilities(
        axes in 0usize..=8,
        buttons in 0usize..=128,
        povs in 0usize..=4,
        state in joy_state(),
    ) {
        let joy = VirtualJoystick::new("Bounds").with_capabilities(axes, buttons, povs);
        let mut session = open(&joy);
        joy.set_state(state);
        session.poll().unwrap();

        for i in axes..=JoyState::AXES {
            prop_assert_eq!(session.axis_value(i), 0);
            prop_assert!(!session.axis_changed(i));
        }
        for i in buttons..=JoyState::BUTTONS {
            prop_assert!(!session.button_value(i));
            prop_assert!(!session.button_changed(i));
        }
        for i in povs..=JoyState::POVS {
            prop_assert_eq!(session.pov_value(i), 0);
            prop_assert!(!session.pov_changed(i));
        }
        for i in 0..axes {
            prop_assert_eq!(session.axis_value(i), state.axes[i]);
        }
    }
}
