use std::collections::BTreeSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::contacts::{ContactRecord, Frame};
use crate::patterns::InteractionPattern;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sorted, deduplicated frames at which one pattern matched in one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSet(Vec<Frame>);

impl FrameSet {
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<Frame> {
        self.0.last().copied()
    }

    /// Maximal runs of consecutive frames as half-open `(start, end)` ranges
    pub fn runs(&self) -> Vec<(Frame, Frame)> {
        let mut runs: Vec<(Frame, Frame)> = Vec::new();
        for &frame in &self.0 {
            match runs.last_mut() {
                Some((_, end)) if *end == frame => *end = frame + 1,
                _ => runs.push((frame, frame + 1)),
            }
        }
        runs
    }
}

impl FromIterator<Frame> for FrameSet {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        let unique: BTreeSet<Frame> = iter.into_iter().collect();
        Self(unique.into_iter().collect())
    }
}

/// Frames of every record whose atoms match `pattern` in either orientation.
///
/// Interaction types are not inspected.
pub fn frames_matching(pattern: &InteractionPattern, contacts: &[ContactRecord]) -> FrameSet {
    contacts
        .iter()
        .filter(|c| pattern.matches(&c.atom_0, &c.atom_1))
        .map(|c| c.frame)
        .collect()
}

/// Compute one FrameSet per (pattern, contact list) pair.
///
/// The result is ordered pattern-major, file-minor:
/// `[(p0, f0), (p0, f1), ..., (p1, f0), ...]`, the same order the default
/// labels are generated in.
pub fn filter_contacts<L>(contact_lists: &[L], patterns: &[InteractionPattern]) -> Vec<FrameSet>
where
    L: AsRef<[ContactRecord]> + Sync,
{
    filter_contacts_with_progress(contact_lists, patterns, &ProgressBar::hidden())
}

pub fn filter_contacts_with_progress<L>(
    contact_lists: &[L],
    patterns: &[InteractionPattern],
    pb: &ProgressBar,
) -> Vec<FrameSet>
where
    L: AsRef<[ContactRecord]> + Sync,
{
    let pairs: Vec<(usize, usize)> = (0..patterns.len())
        .flat_map(|p| (0..contact_lists.len()).map(move |f| (p, f)))
        .collect();

    info!(
        patterns = patterns.len(),
        files = contact_lists.len(),
        "Filtering contacts."
    );
    pb.set_length(pairs.len() as u64);

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let frame_sets: Vec<FrameSet> = iterator
        .map(|&(p, f)| {
            let frames = frames_matching(&patterns[p], contact_lists[f].as_ref());
            debug!(pattern = p, file = f, frames = frames.len(), "Pair filtered.");
            pb.inc(1);
            frames
        })
        .collect();

    pb.finish_with_message("Filtering complete");

    for (p, pattern) in patterns.iter().enumerate() {
        let files = contact_lists.len();
        if files > 0 && frame_sets[p * files..(p + 1) * files].iter().all(FrameSet::is_empty) {
            warn!(
                selector_a = pattern.selector_a.as_str(),
                selector_b = pattern.selector_b.as_str(),
                "Interaction pattern matched no contacts in any input file."
            );
        }
    }

    frame_sets
}

/// Progress bar counting filtered (pattern, file) pairs
pub fn progress_bar(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} traces ({percent}%)")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternSet;

    fn record(frame: Frame, a: &str, b: &str) -> ContactRecord {
        ContactRecord::new(frame, "hb", a, b)
    }

    #[test]
    fn end_to_end_example_matches_both_orientations() {
        let f0 = vec![
            record(1, "A:ILE:51:CD1", "A:PHE:103:CG"),
            record(2, "X", "Y"),
        ];
        let f1 = vec![record(5, "A:PHE:103:CE1", "A:ILE:51:CD1")];
        let patterns = PatternSet::compile(&["A:ILE:51:CD1 A:PHE:103:C[GDEZ].*"]).unwrap();

        let result = filter_contacts(&[f0, f1], &patterns);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].frames(), &[1]);
        assert_eq!(result[1].frames(), &[5]);
    }

    #[test]
    fn swapping_atoms_never_changes_the_result() {
        let patterns = PatternSet::compile(&["A:HIS:172:NE2 A:GLU:143:(OE.|O)"]).unwrap();
        let atoms = [
            ("A:HIS:172:NE2", "A:GLU:143:OE1"),
            ("A:HIS:172:NE2", "A:GLU:143:N"),
            ("A:HIS:172:CA", "A:GLU:143:O"),
            ("A:GLU:143:OE2", "A:HIS:172:NE2"),
        ];
        for (i, (a, b)) in atoms.iter().enumerate() {
            let forward = frames_matching(&patterns[0], &[record(i, a, b)]);
            let reverse = frames_matching(&patterns[0], &[record(i, b, a)]);
            assert_eq!(forward, reverse, "asymmetric result for {a} / {b}");
        }
    }

    #[test]
    fn frames_are_deduplicated_and_ascending() {
        let patterns = PatternSet::compile(&["A:PHE:103.* A:PHE:48.*"]).unwrap();
        let contacts = vec![
            record(9, "A:PHE:103:CZ", "A:PHE:48:CE1"),
            record(3, "A:PHE:48:CD2", "A:PHE:103:CG"),
            record(9, "A:PHE:103:CE2", "A:PHE:48:CZ"),
            record(3, "A:PHE:103:CZ", "A:PHE:48:CZ"),
            record(4, "A:PHE:103:CZ", "A:LEU:7:CD1"),
        ];
        let frames = frames_matching(&patterns[0], &contacts);
        assert_eq!(frames.frames(), &[3, 9]);
    }

    #[test]
    fn output_is_pattern_major_file_minor() {
        let f0 = vec![record(0, "A", "B"), record(1, "C", "D")];
        let f1 = vec![record(2, "B", "A"), record(3, "D", "C")];
        let f1_only_cd = vec![record(7, "C", "D")];
        let patterns = PatternSet::compile(&["A B", "C D"]).unwrap();

        let result = filter_contacts(&[f0.clone(), f1], &patterns);
        let frames: Vec<&[Frame]> = result.iter().map(FrameSet::frames).collect();
        assert_eq!(frames, vec![&[0][..], &[2], &[1], &[3]]);

        let result = filter_contacts(&[f0, f1_only_cd], &patterns);
        assert!(result[1].is_empty());
        assert_eq!(result[3].frames(), &[7]);
    }

    #[test]
    fn interaction_type_is_not_filtered() {
        let patterns = PatternSet::compile(&["A B"]).unwrap();
        let contacts = vec![
            ContactRecord::new(0, "vdw", "A", "B"),
            ContactRecord::new(1, "sb", "A", "B"),
            ContactRecord::new(2, "unknown", "B", "A"),
        ];
        assert_eq!(frames_matching(&patterns[0], &contacts).frames(), &[0, 1, 2]);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        let patterns = PatternSet::compile(&["A B"]).unwrap();
        let no_lists: Vec<Vec<ContactRecord>> = Vec::new();
        assert!(filter_contacts(&no_lists, &patterns).is_empty());
        assert_eq!(filter_contacts(&[Vec::<ContactRecord>::new()], &patterns), vec![FrameSet::default()]);
    }

    #[test]
    fn runs_merge_consecutive_frames() {
        let set: FrameSet = vec![5, 1, 2, 3, 9, 10, 2].into_iter().collect();
        assert_eq!(set.frames(), &[1, 2, 3, 5, 9, 10]);
        assert_eq!(set.runs(), vec![(1, 4), (5, 6), (9, 11)]);
        assert_eq!(set.last(), Some(10));
    }
}
