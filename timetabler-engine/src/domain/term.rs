/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scheduling horizon: school days and their daily slot grid.
//!
//! ```text
//! TermSpec (wire, loosely shaped) ──(Term::from_spec)──► Term (validated, immutable)
//! ```
//!
//! A [`TimeSlot`] is identified by `(day, slot_index)`.  Internally the
//! engine also addresses slots by a *flat index* (`day_offset + slot_index`)
//! so per-resource availability fits in a single [`SlotMask`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compiler::ModelError;
use crate::domain::SlotRef;

// ── ClockTime ─────────────────────────────────────────────────────────────────

/// Time of day with minute resolution, written as `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Returns `None` unless `hour < 24` and `minute < 60`.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: hour * 60 + minute,
            })
        } else {
            None
        }
    }

    /// Parse `"HH:MM"` (surrounding whitespace is ignored, `"8:05"` is accepted).
    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.trim().split_once(':')?;
        let hour = h.trim().parse().ok()?;
        let minute = m.trim().parse().ok()?;
        Self::from_hm(hour, minute)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.minutes
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time '{raw}', expected HH:MM"))
        })
    }
}

// ── Wire shapes ───────────────────────────────────────────────────────────────

/// One period of the daily grid as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySlot {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl DailySlot {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }
}

/// A school day: either a bare name sharing the term's `dailySlots`, or an
/// object with its own slot list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaySpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        slots: Vec<DailySlot>,
    },
}

impl DaySpec {
    fn name(&self) -> &str {
        match self {
            DaySpec::Name(name) => name,
            DaySpec::Detailed { name, .. } => name,
        }
    }
}

/// Term as it arrives in a solve request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub days: Vec<DaySpec>,
    #[serde(default)]
    pub daily_slots: Vec<DailySlot>,
}

impl TermSpec {
    /// Term where every listed day shares `daily_slots`.
    pub fn uniform<I, S>(days: I, daily_slots: Vec<DailySlot>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            days: days.into_iter().map(|d| DaySpec::Name(d.into())).collect(),
            daily_slots,
        }
    }
}

// ── Validated term ────────────────────────────────────────────────────────────

/// One concrete period of the term grid.  Identity is `(day, slot_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub day: usize,
    pub slot_index: usize,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// A validated school day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolDay {
    pub name: String,
    pub slots: Vec<TimeSlot>,
}

/// Validated, immutable scheduling horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    name: Option<String>,
    days: Vec<SchoolDay>,
    /// Flat index of each day's first slot.
    offsets: Vec<usize>,
    total_slots: usize,
}

impl Term {
    /// Validate `spec` and build the slot grid.
    ///
    /// # Errors
    /// [`ModelError::EmptyTerm`], [`ModelError::UnnamedDay`],
    /// [`ModelError::DuplicateDay`], [`ModelError::EmptyDay`], [`ModelError::InvalidSlot`] or
    /// [`ModelError::OverlappingSlots`].
    pub fn from_spec(spec: &TermSpec) -> Result<Self, ModelError> {
        if spec.days.is_empty() {
            return Err(ModelError::EmptyTerm);
        }

        let mut days: Vec<SchoolDay> = Vec::with_capacity(spec.days.len());
        for (day_index, day_spec) in spec.days.iter().enumerate() {
            let name = day_spec.name().trim().to_string();
            if name.is_empty() {
                return Err(ModelError::UnnamedDay { index: day_index });
            }
            if days.iter().any(|d| d.name.eq_ignore_ascii_case(&name)) {
                return Err(ModelError::DuplicateDay { day: name });
            }

            let raw_slots = match day_spec {
                DaySpec::Detailed { slots, .. } if !slots.is_empty() => slots,
                _ => &spec.daily_slots,
            };
            if raw_slots.is_empty() {
                return Err(ModelError::EmptyDay { day: name });
            }

            let mut slots = Vec::with_capacity(raw_slots.len());
            for (slot_index, raw) in raw_slots.iter().enumerate() {
                if raw.end <= raw.start {
                    return Err(ModelError::InvalidSlot {
                        day: name,
                        slot: slot_index,
                        start: raw.start.to_string(),
                        end: raw.end.to_string(),
                    });
                }
                if let Some(prev) = slots.last().map(|s: &TimeSlot| s.end) {
                    if raw.start < prev {
                        return Err(ModelError::OverlappingSlots {
                            day: name,
                            slot: slot_index,
                        });
                    }
                }
                slots.push(TimeSlot {
                    day: day_index,
                    slot_index,
                    start: raw.start,
                    end: raw.end,
                });
            }

            days.push(SchoolDay { name, slots });
        }

        let mut offsets = Vec::with_capacity(days.len());
        let mut total_slots = 0usize;
        for day in &days {
            offsets.push(total_slots);
            total_slots += day.slots.len();
        }

        Ok(Self {
            name: spec.name.clone(),
            days,
            offsets,
            total_slots,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn days(&self) -> &[SchoolDay] {
        &self.days
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Number of slots on `day` (0 for an out-of-range day).
    pub fn slot_count(&self, day: usize) -> usize {
        self.days.get(day).map(|d| d.slots.len()).unwrap_or(0)
    }

    /// Length of the longest day, in slots.
    pub fn longest_day(&self) -> usize {
        self.days.iter().map(|d| d.slots.len()).max().unwrap_or(0)
    }

    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    /// Case-insensitive day lookup.
    pub fn day_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.days
            .iter()
            .position(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn slot(&self, day: usize, slot_index: usize) -> Option<&TimeSlot> {
        self.days.get(day)?.slots.get(slot_index)
    }

    /// Flat index of `(day, slot_index)`.  Callers guarantee both are in range.
    pub fn flat_index(&self, day: usize, slot_index: usize) -> usize {
        debug_assert!(slot_index < self.slot_count(day));
        self.offsets[day] + slot_index
    }

    /// Flat offset of each day's first slot.
    pub fn day_offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Resolve slot references into a mask.
    ///
    /// `referrer` names the resource or constraint holding the references and
    /// only appears in error messages.
    pub fn mask_from_refs(&self, refs: &[SlotRef], referrer: &str) -> Result<SlotMask, ModelError> {
        let mut mask = SlotMask::empty(self.total_slots);
        for r in refs {
            let day = self.day_index(&r.day).ok_or_else(|| ModelError::UnknownDay {
                referrer: referrer.to_string(),
                day: r.day.clone(),
            })?;
            match r.slot {
                Some(slot) => {
                    if slot >= self.slot_count(day) {
                        return Err(ModelError::UnknownSlot {
                            referrer: referrer.to_string(),
                            day: r.day.clone(),
                            slot,
                        });
                    }
                    mask.insert(self.flat_index(day, slot));
                }
                None => {
                    for slot in 0..self.slot_count(day) {
                        mask.insert(self.flat_index(day, slot));
                    }
                }
            }
        }
        Ok(mask)
    }
}

// ── SlotMask ──────────────────────────────────────────────────────────────────

/// Set of term slots, addressed by flat index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMask {
    bits: Vec<bool>,
}

impl SlotMask {
    pub fn full(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    pub fn empty(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn insert(&mut self, flat: usize) {
        self.bits[flat] = true;
    }

    pub fn contains(&self, flat: usize) -> bool {
        self.bits.get(flat).copied().unwrap_or(false)
    }

    /// `true` if every slot in `flat..flat + len` is in the mask.
    pub fn contains_block(&self, flat: usize, len: usize) -> bool {
        (flat..flat + len).all(|i| self.contains(i))
    }

    pub fn intersect(&mut self, other: &SlotMask) {
        for (bit, keep) in self.bits.iter_mut().zip(&other.bits) {
            *bit = *bit && *keep;
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn slot(start: &str, end: &str) -> DailySlot {
        DailySlot::new(t(start), t(end))
    }

    // ── ClockTime ─────────────────────────────────────────────────────────────

    #[test]
    fn clock_time_parses_and_formats() {
        assert_eq!(t("08:40").minutes(), 520);
        assert_eq!(t("8:05").to_string(), "08:05");
        assert_eq!(t(" 23:59 ").minutes(), 23 * 60 + 59);
    }

    #[test]
    fn clock_time_rejects_out_of_range_and_garbage() {
        assert!(ClockTime::parse("24:00").is_none());
        assert!(ClockTime::parse("10:60").is_none());
        assert!(ClockTime::parse("noon").is_none());
        assert!(ClockTime::parse("10").is_none());
    }

    #[test]
    fn clock_time_deserialize_error_names_the_value() {
        let err = serde_json::from_str::<ClockTime>("\"7h30\"").unwrap_err();
        assert!(err.to_string().contains("7h30"));
    }

    // ── Term::from_spec ───────────────────────────────────────────────────────

    #[test]
    fn uniform_term_builds_flat_grid() {
        let spec = TermSpec::uniform(
            ["Monday", "Tuesday"],
            vec![slot("08:00", "08:40"), slot("08:40", "09:20"), slot("09:20", "10:00")],
        );
        let term = Term::from_spec(&spec).unwrap();

        assert_eq!(term.day_count(), 2);
        assert_eq!(term.total_slots(), 6);
        assert_eq!(term.flat_index(1, 2), 5);
        assert_eq!(term.day_index("tuesday"), Some(1));
        let s = term.slot(1, 1).unwrap();
        assert_eq!((s.day, s.slot_index), (1, 1));
        assert_eq!(s.start.to_string(), "08:40");
    }

    #[test]
    fn detailed_day_uses_its_own_slots() {
        let json = r#"{
            "days": ["Mon", {"name": "Fri", "slots": [{"start": "08:00", "end": "09:30"}]}],
            "dailySlots": [{"start": "08:00", "end": "09:00"}, {"start": "09:00", "end": "10:00"}]
        }"#;
        let spec: TermSpec = serde_json::from_str(json).unwrap();
        let term = Term::from_spec(&spec).unwrap();

        assert_eq!(term.slot_count(0), 2);
        assert_eq!(term.slot_count(1), 1);
        assert_eq!(term.longest_day(), 2);
        assert_eq!(term.day_offsets(), &[0, 2]);
    }

    #[test]
    fn empty_term_is_rejected() {
        let spec = TermSpec::default();
        assert_eq!(Term::from_spec(&spec), Err(ModelError::EmptyTerm));
    }

    #[test]
    fn day_without_slots_is_rejected() {
        let spec = TermSpec::uniform(["Monday"], vec![]);
        assert!(matches!(
            Term::from_spec(&spec),
            Err(ModelError::EmptyDay { .. })
        ));
    }

    #[test]
    fn duplicate_day_is_rejected_case_insensitively() {
        let spec = TermSpec::uniform(["Monday", "MONDAY"], vec![slot("08:00", "09:00")]);
        assert!(matches!(
            Term::from_spec(&spec),
            Err(ModelError::DuplicateDay { .. })
        ));
    }

    #[test]
    fn blank_day_name_is_rejected() {
        let spec = TermSpec::uniform(["Monday", "  "], vec![slot("08:00", "09:00")]);
        let err = Term::from_spec(&spec).unwrap_err();
        assert_eq!(err, ModelError::UnnamedDay { index: 1 });
        assert_eq!(err.to_string(), "day 1 has no name");
    }

    #[test]
    fn inverted_slot_is_rejected() {
        let spec = TermSpec::uniform(["Monday"], vec![slot("09:00", "08:00")]);
        assert!(matches!(
            Term::from_spec(&spec),
            Err(ModelError::InvalidSlot { slot: 0, .. })
        ));
    }

    #[test]
    fn zero_length_slot_does_not_end_after_it_starts() {
        let spec = TermSpec::uniform(["Monday"], vec![slot("09:00", "09:00")]);
        let err = Term::from_spec(&spec).unwrap_err();
        assert!(matches!(err, ModelError::InvalidSlot { slot: 0, .. }));
        assert!(err.to_string().contains("does not end after it starts"), "{err}");
    }

    #[test]
    fn overlapping_or_unsorted_slots_are_rejected() {
        let spec = TermSpec::uniform(
            ["Monday"],
            vec![slot("08:00", "09:00"), slot("08:30", "09:30")],
        );
        assert!(matches!(
            Term::from_spec(&spec),
            Err(ModelError::OverlappingSlots { slot: 1, .. })
        ));
    }

    // ── SlotMask / mask_from_refs ─────────────────────────────────────────────

    #[test]
    fn mask_from_refs_handles_whole_day_and_single_slot() {
        let spec = TermSpec::uniform(
            ["Monday", "Tuesday"],
            vec![slot("08:00", "09:00"), slot("09:00", "10:00")],
        );
        let term = Term::from_spec(&spec).unwrap();
        let mask = term
            .mask_from_refs(&[SlotRef::whole_day("Monday"), SlotRef::at("Tuesday", 1)], "T1")
            .unwrap();

        assert!(mask.contains(0));
        assert!(mask.contains(1));
        assert!(!mask.contains(2));
        assert!(mask.contains(3));
        assert_eq!(mask.count(), 3);
        assert!(mask.contains_block(0, 2));
        assert!(!mask.contains_block(1, 2));
    }

    #[test]
    fn mask_from_refs_rejects_unknown_day_and_slot() {
        let spec = TermSpec::uniform(["Monday"], vec![slot("08:00", "09:00")]);
        let term = Term::from_spec(&spec).unwrap();

        assert!(matches!(
            term.mask_from_refs(&[SlotRef::whole_day("Sunday")], "T1"),
            Err(ModelError::UnknownDay { .. })
        ));
        assert!(matches!(
            term.mask_from_refs(&[SlotRef::at("Monday", 4)], "T1"),
            Err(ModelError::UnknownSlot { slot: 4, .. })
        ));
    }

    #[test]
    fn intersect_keeps_common_slots() {
        let mut a = SlotMask::full(4);
        let mut b = SlotMask::empty(4);
        b.insert(1);
        b.insert(3);
        a.intersect(&b);
        assert_eq!(a, b);
    }
}
