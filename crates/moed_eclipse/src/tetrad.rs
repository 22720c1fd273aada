//! Blood-moon tetrad detection.
//!
//! Every window of four chronologically consecutive blood moons is tested;
//! a window is a tetrad iff all three gaps lie strictly inside the
//! configured bounds (about six synodic months). Windows may overlap, so
//! five qualifying blood moons yield two tetrads sharing three members.

use crate::eclipse_types::{EclipseEvent, EclipseKind, TetradConfig, TetradSequence, days_between};

/// Tetrads among `lunar` eclipses (any order; non-lunar events are ignored).
pub fn find_tetrads(lunar: &[EclipseEvent], config: &TetradConfig) -> Vec<TetradSequence> {
    let mut lunar: Vec<&EclipseEvent> = lunar
        .iter()
        .filter(|e| e.kind == EclipseKind::Lunar)
        .collect();
    lunar.sort_by_key(|e| e.date);

    // Position in the lunar sequence is kept to detect intervening
    // non-total lunar eclipses.
    let blood: Vec<(usize, &EclipseEvent)> = lunar
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_blood_moon)
        .map(|(i, e)| (i, *e))
        .collect();

    blood
        .windows(4)
        .filter(|w| {
            w.windows(2)
                .all(|pair| config.accepts_gap(days_between(pair[0].1.date, pair[1].1.date)))
        })
        .filter(|w| !config.require_consecutive || w[3].0 - w[0].0 == 3)
        .map(|w| {
            TetradSequence::new([
                w[0].1.clone(),
                w[1].1.clone(),
                w[2].1.clone(),
                w[3].1.clone(),
            ])
        })
        .collect()
}
