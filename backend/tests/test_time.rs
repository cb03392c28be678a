//! Tests for TimeManager

use facility_sim_core::TimeManager;

#[test]
fn test_time_manager_new() {
    let time = TimeManager::new(1.0);
    assert_eq!(time.current_tick(), 0);
    assert_eq!(time.elapsed(), 0.0);
    assert_eq!(time.dt(), 1.0);
}

#[test]
fn test_advance_tick() {
    let mut time = TimeManager::new(0.25);

    time.advance_tick();
    assert_eq!(time.current_tick(), 1);
    assert_eq!(time.elapsed(), 0.25);

    time.advance_tick();
    assert_eq!(time.current_tick(), 2);
    assert_eq!(time.elapsed(), 0.5);
}

#[test]
fn test_elapsed_scales_with_dt() {
    let mut fine = TimeManager::new(0.5);
    let mut coarse = TimeManager::new(2.0);

    for _ in 0..8 {
        fine.advance_tick();
        coarse.advance_tick();
    }

    assert_eq!(fine.current_tick(), coarse.current_tick());
    assert_eq!(fine.elapsed(), 4.0);
    assert_eq!(coarse.elapsed(), 16.0);
}

#[test]
#[should_panic(expected = "dt must be positive")]
fn test_negative_dt_panics() {
    TimeManager::new(-1.0);
}
