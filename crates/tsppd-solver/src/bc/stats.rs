// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::bc::cut::CutFamily;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// One statistics bucket: cuts added and accumulated separation time.
/// Atomic because the callback is invoked from the engine's worker threads.
#[derive(Debug, Default)]
pub struct FamilyStats {
    cuts_added: AtomicU64,
    time_ns: AtomicU64,
}

impl FamilyStats {
    #[inline]
    pub fn record_cuts(&self, count: u64) {
        self.cuts_added.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_time(&self, elapsed: Duration) {
        self.time_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn cuts_added(&self) -> u64 {
        self.cuts_added.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn seconds(&self) -> f64 {
        self.time_ns.load(Ordering::Relaxed) as f64 * 1e-9
    }
}

/// Per-family entry of the exported key/value report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FamilyReport {
    pub cuts_added: u64,
    pub separation_seconds: f64,
}

/// Monotonic per-family counters and timings, reset only at solve start
/// (i.e. by constructing a fresh collector).
#[derive(Debug, Default)]
pub struct CutStats {
    families: [FamilyStats; 6],
}

impl CutStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn family(&self, family: CutFamily) -> &FamilyStats {
        &self.families[family.bucket()]
    }

    /// Records one separation run of `family`.
    #[inline]
    pub fn record_separation(&self, family: CutFamily, cuts: u64, elapsed: Duration) {
        let bucket = self.family(family);
        bucket.record_cuts(cuts);
        bucket.record_time(elapsed);
    }

    #[inline]
    pub fn total_cuts_added(&self) -> u64 {
        CutFamily::ALL
            .iter()
            .map(|&f| self.family(f).cuts_added())
            .sum()
    }

    /// Flat key/value report, keyed by family label.
    pub fn report(&self) -> BTreeMap<String, FamilyReport> {
        CutFamily::ALL
            .iter()
            .map(|&f| {
                (
                    f.label().to_owned(),
                    FamilyReport {
                        cuts_added: self.family(f).cuts_added(),
                        separation_seconds: self.family(f).seconds(),
                    },
                )
            })
            .collect()
    }
}
