use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use scout_core::{filter_recent, Bounty, DEFAULT_WINDOW};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
}

fn posted(link: &str, at: DateTime<Utc>) -> Bounty {
    Bounty::new("t", 10, link, at)
}

#[test]
fn default_window_is_a_day() {
    assert_eq!(DEFAULT_WINDOW, TimeDelta::hours(24));
}

#[test]
fn boundary_is_exclusive() {
    let on_boundary = posted("/edge", now() - TimeDelta::hours(24));
    let just_inside = posted("/inside", now() - TimeDelta::hours(24) + TimeDelta::seconds(1));

    let kept = filter_recent(vec![on_boundary, just_inside], DEFAULT_WINDOW, now());

    let links: Vec<_> = kept.iter().map(|b| b.link.as_str()).collect();
    assert_eq!(links, vec!["/inside"]);
}

#[test]
fn order_is_preserved_and_old_entries_dropped() {
    let bounties = vec![
        posted("/c", now() - TimeDelta::hours(1)),
        posted("/old", now() - TimeDelta::hours(30)),
        posted("/a", now() - TimeDelta::minutes(5)),
        posted("/future", now() + TimeDelta::hours(2)),
    ];

    let kept = filter_recent(bounties, DEFAULT_WINDOW, now());

    let links: Vec<_> = kept.iter().map(|b| b.link.as_str()).collect();
    assert_eq!(links, vec!["/c", "/a", "/future"]);
}

#[test]
fn custom_window_is_honoured() {
    let bounties = vec![
        posted("/recent", now() - TimeDelta::minutes(30)),
        posted("/older", now() - TimeDelta::hours(2)),
    ];

    let kept = filter_recent(bounties, TimeDelta::hours(1), now());

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].link, "/recent");
}

#[test]
fn window_past_the_start_of_time_keeps_everything() {
    let bounties = vec![
        posted("/ancient", Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()),
        posted("/recent", now() - TimeDelta::minutes(5)),
    ];

    let kept = filter_recent(bounties, TimeDelta::hours(i64::from(u32::MAX)), now());

    let links: Vec<_> = kept.iter().map(|b| b.link.as_str()).collect();
    assert_eq!(links, vec!["/ancient", "/recent"]);
}
