use super::*;

#[test]
fn clamped_duration_respects_control_range() {
    assert_eq!(ScrollDuration::clamped(1).secs(), ScrollDuration::MIN);
    assert_eq!(ScrollDuration::clamped(500).secs(), ScrollDuration::MAX);
    assert_eq!(ScrollDuration::clamped(45).secs(), 45);
    assert_eq!(ScrollDuration::from_secs(0).secs(), 1);
}

#[test]
fn direction_maps_to_playback_not_mirroring() {
    assert_eq!(Direction::Left.playback(), Playback::Normal);
    assert_eq!(Direction::Right.playback(), Playback::Reverse);
    assert_eq!("RIGHT".parse::<Direction>().unwrap(), Direction::Right);
    assert!("up".parse::<Direction>().is_err());
}

#[test]
fn display_width_accepts_only_known_boards() {
    assert_eq!(DisplayWidth::from_pixels(10104).unwrap(), DisplayWidth::Upper);
    assert!(DisplayWidth::from_pixels(1920).is_err());
    assert_eq!(
        "20208".parse::<DisplayWidth>().unwrap(),
        DisplayWidth::UpperFullWrap
    );
    assert_eq!("lower".parse::<DisplayWidth>().unwrap(), DisplayWidth::Lower);
}

#[test]
fn display_width_serializes_as_pixels() {
    let json = serde_json::to_string(&DisplayWidth::Upper).unwrap();
    assert_eq!(json, "10104");
    assert!(serde_json::from_str::<DisplayWidth>("123").is_err());
}

#[test]
fn sets_are_visible_to_getters_and_subscribers() {
    let model = ParameterModel::default();
    let mut rx = model.subscribe();
    assert!(!rx.has_changed().unwrap());

    model.set_duration(ScrollDuration::from_secs(12));
    model.set_direction(Direction::Right);
    model.set_width(DisplayWidth::UpperFullWrap);

    assert!(rx.has_changed().unwrap());
    let seen = *rx.borrow_and_update();
    assert_eq!(seen, model.get());
    assert_eq!(seen.duration.secs(), 12);
    assert_eq!(seen.direction, Direction::Right);
    assert_eq!(seen.width, DisplayWidth::UpperFullWrap);
}

#[test]
fn last_set_wins_in_issue_order() {
    let model = ParameterModel::default();
    let rx = model.subscribe();
    model.set_duration(ScrollDuration::from_secs(10));
    model.set_duration(ScrollDuration::from_secs(20));
    assert_eq!(rx.borrow().duration.secs(), 20);
}
