use egui::{Color32, Event, PointerButton, Pos2, Rect, Sense, TouchPhase, Ui, Vec2};

use crate::core::note::{KeyClass, NoteRegistry, KEY_COUNT};
use crate::core::pointer::PointerId;

// Column (in half-key units) and row of each pitch class within an octave.
const OCTAVE_COLUMNS: [f32; 12] = [0.0, 1.0, 2.0, 3.0, 4.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
const OCTAVE_ROWS: [f32; 12] = [0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];

const X_SCALE: f32 = 25.0;
const Y_SCALE: f32 = 70.0;
const CORNER_RADIUS: f32 = 5.0;

/// Rectangle of key `id`, relative to the keyboard's top-left corner.
pub fn key_rect(id: usize) -> Rect {
    let octave = (id / 12) as f32;
    let pos = id % 12;
    let x = 1.0 + X_SCALE * (octave * 14.0 + OCTAVE_COLUMNS[pos]);
    let y = 100.0 - Y_SCALE * OCTAVE_ROWS[pos];
    Rect::from_min_size(Pos2::new(x, y), Vec2::new(2.0 * X_SCALE - 2.0, Y_SCALE - 2.0))
}

/// Key under a point given relative to the keyboard's top-left corner.
pub fn hit_test(pos: Pos2) -> Option<usize> {
    (0..KEY_COUNT).find(|&id| key_rect(id).contains(pos))
}

/// Size needed to draw every key.
pub fn keyboard_size() -> Vec2 {
    (0..KEY_COUNT)
        .map(key_rect)
        .fold(Vec2::ZERO, |size, rect| size.max(rect.max.to_vec2()))
        + Vec2::splat(1.0)
}

/// A gesture boundary extracted from one frame's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGesture {
    Press(PointerId, usize),
    Release(PointerId),
}

fn key_color(class: KeyClass) -> Color32 {
    match class {
        KeyClass::White => Color32::from_gray(235),
        KeyClass::Black => Color32::from_gray(35),
        KeyClass::Pressed => Color32::from_rgb(0, 188, 212),
    }
}

/// Draw the keyboard and collect this frame's gestures.
pub fn show(ui: &mut Ui, registry: &NoteRegistry) -> Vec<KeyGesture> {
    let (response, painter) = ui.allocate_painter(keyboard_size(), Sense::click_and_drag());
    let origin = response.rect.min;

    painter.rect_filled(response.rect, CORNER_RADIUS, Color32::from_gray(70));
    for note in registry.notes() {
        let rect = key_rect(note.id()).translate(origin.to_vec2());
        painter.rect_filled(rect, CORNER_RADIUS, key_color(note.class()));
    }

    let (events, touching) = ui.input(|i| (i.events.clone(), i.any_touches()));
    gestures_from_events(&events, touching, origin)
}

/// Turn raw input events into key gestures for a keyboard drawn at `origin`.
///
/// Presses count only inside the keyboard; releases count anywhere. Touch
/// input also arrives as a simulated mouse, so mouse buttons are skipped
/// while a touch is active or the frame carries any touch event. A tap that
/// starts and ends within one frame leaves no active touch behind.
pub fn gestures_from_events(events: &[Event], touch_active: bool, origin: Pos2) -> Vec<KeyGesture> {
    let touching = touch_active || events.iter().any(|e| matches!(e, Event::Touch { .. }));
    let key_at = |pos: Pos2| hit_test(pos - origin.to_vec2());

    let mut gestures = Vec::new();
    for event in events {
        match *event {
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                ..
            } if !touching => {
                if pressed {
                    if let Some(id) = key_at(pos) {
                        gestures.push(KeyGesture::Press(PointerId::Mouse, id));
                    }
                } else {
                    gestures.push(KeyGesture::Release(PointerId::Mouse));
                }
            }
            Event::Touch { id, phase, pos, .. } => {
                let pointer = PointerId::Touch(id.0);
                match phase {
                    TouchPhase::Start => {
                        if let Some(key) = key_at(pos) {
                            gestures.push(KeyGesture::Press(pointer, key));
                        }
                    }
                    TouchPhase::End | TouchPhase::Cancel => {
                        gestures.push(KeyGesture::Release(pointer));
                    }
                    TouchPhase::Move => {}
                }
            }
            _ => {}
        }
    }
    gestures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::note::RestingClass;
    use egui::{Modifiers, TouchDeviceId, TouchId};

    fn mouse(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn touch(id: u64, phase: TouchPhase, pos: Pos2) -> Event {
        Event::Touch {
            device_id: TouchDeviceId(0),
            id: TouchId(id),
            phase,
            pos,
            force: None,
        }
    }

    #[test]
    fn geometry_matches_layout() {
        assert_eq!(key_rect(0), Rect::from_min_size(Pos2::new(1.0, 100.0), Vec2::new(48.0, 68.0)));
        assert_eq!(key_rect(1).min, Pos2::new(26.0, 30.0));
        assert_eq!(key_rect(5).min, Pos2::new(151.0, 100.0));
        assert_eq!(key_rect(12).min, Pos2::new(351.0, 100.0));
    }

    #[test]
    fn black_keys_sit_in_upper_row() {
        for id in 0..KEY_COUNT {
            let upper = key_rect(id).min.y < 100.0;
            assert_eq!(upper, RestingClass::for_key(id) == RestingClass::Black, "key {}", id);
        }
    }

    #[test]
    fn hit_test_maps_each_key_center() {
        for id in 0..KEY_COUNT {
            assert_eq!(hit_test(key_rect(id).center()), Some(id));
        }
        assert_eq!(hit_test(Pos2::new(0.0, 0.0)), None);
        assert_eq!(hit_test(Pos2::new(10_000.0, 120.0)), None);
    }

    #[test]
    fn size_covers_all_keys() {
        let size = keyboard_size();
        for id in 0..KEY_COUNT {
            assert!(key_rect(id).max.x <= size.x && key_rect(id).max.y <= size.y);
        }
    }

    #[test]
    fn mouse_press_and_release_anywhere() {
        let origin = Pos2::new(10.0, 20.0);
        let inside = key_rect(3).center() + origin.to_vec2();
        let events = [mouse(inside, true), mouse(Pos2::new(-50.0, -50.0), false)];
        assert_eq!(
            gestures_from_events(&events, false, origin),
            vec![
                KeyGesture::Press(PointerId::Mouse, 3),
                KeyGesture::Release(PointerId::Mouse)
            ]
        );
    }

    #[test]
    fn quick_tap_in_one_frame_is_a_single_gesture() {
        let pos = key_rect(7).center();
        let events = [
            touch(4, TouchPhase::Start, pos),
            mouse(pos, true),
            touch(4, TouchPhase::End, pos),
            mouse(pos, false),
        ];
        assert_eq!(
            gestures_from_events(&events, false, Pos2::ZERO),
            vec![
                KeyGesture::Press(PointerId::Touch(4), 7),
                KeyGesture::Release(PointerId::Touch(4))
            ]
        );
    }

    #[test]
    fn simulated_mouse_skipped_while_touch_held() {
        let pos = key_rect(0).center();
        assert!(gestures_from_events(&[mouse(pos, true)], true, Pos2::ZERO).is_empty());
    }
}
