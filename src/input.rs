use crate::state::State;
use delta_life::ControlEvent;
use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Key bindings for a running session.
pub fn control_for_key(code: KeyCode) -> Option<ControlEvent> {
    match code {
        KeyCode::KeyP => Some(ControlEvent::Pause),
        KeyCode::KeyR => Some(ControlEvent::Resume),
        KeyCode::KeyS => Some(ControlEvent::Restart),
        KeyCode::KeyQ | KeyCode::Escape => Some(ControlEvent::Quit),
        KeyCode::ArrowUp => Some(ControlEvent::SpeedUp),
        KeyCode::ArrowDown => Some(ControlEvent::SpeedDown),
        _ => None,
    }
}

pub fn handle_keyboard(state: &mut State, event: &KeyEvent) {
    if event.state != ElementState::Pressed {
        return;
    }
    let PhysicalKey::Code(code) = event.physical_key else {
        return;
    };
    let Some(control) = control_for_key(code) else {
        return;
    };
    // Holding an arrow keeps changing the speed; everything else fires once.
    let repeats = matches!(control, ControlEvent::SpeedUp | ControlEvent::SpeedDown);
    if event.repeat && !repeats {
        return;
    }

    if state.has_session() {
        state.apply_control(control);
    } else if code == KeyCode::Escape {
        // Escape on the setup menu leaves the program.
        log::info!("Escape pressed on setup menu");
        state.quit_requested = true;
    }
}
