//! Test tree structure and sequential case execution.
//!
//! The catalog builds a hierarchy of named groups with
//! [`TransformFeedbackCase`] leaves; the runner flattens it into
//! dot-separated full names and executes cases one at a time, each owning
//! its GPU objects exclusively between `init` and `deinit`.

use tracing::info;

use crate::case::{CaseError, CaseStatus, InitOutcome, TransformFeedbackCase};
use crate::context::{GlContext, PixelCompare};

/// Whether a case has more scripts to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterateResult {
    /// More scripts remain.
    Continue,
    /// The case is done (all scripts consumed, or one failed).
    Stop,
}

/// A named group of cases and sub-groups.
#[derive(Default)]
pub struct TestGroup {
    /// Group name, one dotted-path segment.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Child groups and cases, in execution order.
    pub children: Vec<TestTree>,
}

impl TestGroup {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child group.
    pub fn add_group(&mut self, group: TestGroup) {
        self.children.push(TestTree::Group(group));
    }

    /// Appends a leaf case.
    pub fn add_case(&mut self, case: TransformFeedbackCase) {
        self.children.push(TestTree::Case(case));
    }
}

/// A node of the test hierarchy.
pub enum TestTree {
    /// An inner group.
    Group(TestGroup),
    /// A leaf case.
    Case(TransformFeedbackCase),
}

/// A flattened leaf: the case plus its dot-separated path from the root.
pub struct TestCase {
    /// Full dotted name, e.g. `transform_feedback.basic_types.interleaved.points.lowp_float`.
    pub full_name: String,
    /// The case itself.
    pub case: TransformFeedbackCase,
}

/// Flattens a tree into leaves in depth-first order, joining group and
/// case names with dots.
pub fn flatten_tree(tree: TestTree) -> Vec<TestCase> {
    let mut cases = Vec::new();
    collect(tree, "", &mut cases);
    cases
}

fn collect(tree: TestTree, prefix: &str, out: &mut Vec<TestCase>) {
    match tree {
        TestTree::Case(case) => {
            let full_name = if prefix.is_empty() {
                case.name().to_owned()
            } else {
                format!("{prefix}.{}", case.name())
            };
            out.push(TestCase { full_name, case });
        }
        TestTree::Group(group) => {
            let next = if prefix.is_empty() {
                group.name
            } else {
                format!("{prefix}.{}", group.name)
            };
            for child in group.children {
                collect(child, &next, out);
            }
        }
    }
}

/// Runs one case to completion: `init`, `iterate` until it stops, then
/// `deinit`, returning the classified final status.
///
/// `deinit` runs even when iteration aborts with a [`CaseError`], so the
/// next case starts with no leftover GPU objects.
pub fn run_case<C: GlContext, P: PixelCompare>(
    case: &mut TransformFeedbackCase,
    ctx: &mut C,
    compare: &P,
) -> Result<CaseStatus, CaseError> {
    match case.init(ctx)? {
        InitOutcome::Ready => {}
        InitOutcome::NotSupported { reason } => {
            return Ok(CaseStatus::NotSupported { reason });
        }
        InitOutcome::CompileFailed { log } => return Ok(CaseStatus::CompileFailed { log }),
        InitOutcome::LinkFailed { log } => return Ok(CaseStatus::LinkFailed { log }),
    }

    let result = loop {
        match case.iterate(ctx, compare) {
            Ok(IterateResult::Continue) => {}
            Ok(IterateResult::Stop) => break Ok(()),
            Err(err) => break Err(err),
        }
    };
    case.deinit(ctx);
    result?;

    let status = if case.passed() {
        CaseStatus::Pass
    } else {
        CaseStatus::Fail
    };
    info!(case = %case.name(), status = ?status, "case finished");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::DrawScript;
    use crate::topology::PrimitiveType;
    use pretty_assertions::assert_eq;
    use xfb_shadergen::{BufferMode, Interpolation, ProgramSpec};
    use xfb_types::{DataType, Precision, VarType};

    fn dummy_case(name: &str) -> TransformFeedbackCase {
        let mut spec = ProgramSpec::new();
        spec.add_varying(
            "v_a",
            VarType::basic(DataType::Float, Precision::Highp),
            Interpolation::Smooth,
        );
        spec.capture("v_a");
        TransformFeedbackCase::new(
            name,
            "",
            PrimitiveType::Points,
            BufferMode::Interleaved,
            spec,
            vec![DrawScript::new("single", vec![])],
        )
    }

    #[test]
    fn flatten_joins_names_with_dots() {
        let mut root = TestGroup::new("transform_feedback", "");
        let mut inner = TestGroup::new("position", "");
        inner.add_case(dummy_case("points_interleaved"));
        inner.add_case(dummy_case("lines_separate"));
        root.add_group(inner);
        root.add_case(dummy_case("toplevel"));

        let flat = flatten_tree(TestTree::Group(root));
        let names: Vec<&str> = flat.iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "transform_feedback.position.points_interleaved",
                "transform_feedback.position.lines_separate",
                "transform_feedback.toplevel",
            ]
        );
    }

    #[test]
    fn flatten_of_bare_case_uses_its_own_name() {
        let flat = flatten_tree(TestTree::Case(dummy_case("solo")));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].full_name, "solo");
    }
}
