//! Per-node text rewriting with in-pass deletion.

use std::fmt;

use regex::Regex;
use tracing::instrument;

use crate::arena::SourceTree;
use crate::errors::{TreeError, TreeResult};

/// What a rule decided for one node's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Replace the node's text; the next rule sees the replacement.
    Rewrite(String),
    /// Remove the node; `keep_children` promotes its children in place.
    Delete { keep_children: bool },
}

/// A single transformation rule: current text in, outcome out.
pub type TransformRule = Box<dyn Fn(&str) -> RuleOutcome + Send + Sync>;

/// Ordered rule list applied by [`SourceTree::apply_transformer`].
#[derive(Default)]
pub struct Transformer {
    rules: Vec<TransformRule>,
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Transformer {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn push(&mut self, rule: TransformRule) {
        self.rules.push(rule);
    }

    /// Adds a rule, builder-style.
    pub fn with_rule(mut self, rule: TransformRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn extend(&mut self, other: Transformer) {
        self.rules.extend(other.rules);
    }

    pub(crate) fn rules(&self) -> &[TransformRule] {
        &self.rules
    }

    /// Builds a transformer from textual rule specs: `OLD=NEW` replacement
    /// pairs plus regex patterns whose matching nodes get deleted.
    pub fn from_specs(
        replace_specs: &[String],
        delete_specs: &[String],
        keep_children: bool,
    ) -> TreeResult<Self> {
        let mut transformer = Transformer::new();
        for spec in replace_specs {
            let (old, new) = spec
                .split_once('=')
                .ok_or_else(|| TreeError::InvalidRule(format!("expected OLD=NEW, got '{spec}'")))?;
            transformer.push(replace(old, new));
        }
        for spec in delete_specs {
            let pattern =
                Regex::new(spec).map_err(|e| TreeError::InvalidRule(e.to_string()))?;
            transformer.push(delete_matching(pattern, keep_children));
        }
        Ok(transformer)
    }
}

/// Rule replacing every occurrence of `old` with `new` in a node's text.
pub fn replace(old: &str, new: &str) -> TransformRule {
    let old = old.to_string();
    let new = new.to_string();
    Box::new(move |text| RuleOutcome::Rewrite(text.replace(&old, &new)))
}

/// Rule deleting nodes whose text matches `pattern`; non-matching text
/// passes through unchanged.
pub fn delete_matching(pattern: Regex, keep_children: bool) -> TransformRule {
    Box::new(move |text| {
        if pattern.is_match(text) {
            RuleOutcome::Delete { keep_children }
        } else {
            RuleOutcome::Rewrite(text.to_string())
        }
    })
}

/// Counts from one transformer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Nodes whose text ended up different
    pub rewritten: usize,
    /// Nodes removed by a delete outcome
    pub deleted: usize,
}

impl SourceTree {
    /// Extends the stored rule list; rules set earlier keep running first.
    #[instrument(level = "debug", skip(self, transformer))]
    pub fn set_transformer(&mut self, transformer: Transformer) {
        self.transformer.extend(transformer);
    }

    pub fn has_transformer(&self) -> bool {
        !self.transformer.is_empty()
    }

    /// Runs the stored transformer once over the whole tree.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_transformer(&mut self) -> TreeResult<TransformReport> {
        let transformer = std::mem::take(&mut self.transformer);
        let report = self.apply_rules(&transformer);
        self.transformer = transformer;
        report
    }

    /// Runs `rules` once over every node in flattened pre-order.
    ///
    /// A delete outcome removes the node immediately and skips its remaining
    /// rules; nodes already detached with a deleted ancestor earlier in the
    /// pass are skipped entirely. Categories are not re-sniffed on rewrite.
    #[instrument(level = "debug", skip(self, rules))]
    pub fn apply_rules(&mut self, rules: &Transformer) -> TreeResult<TransformReport> {
        if rules.is_empty() {
            return Err(TreeError::EmptyTransformer);
        }

        let mut report = TransformReport::default();
        for idx in self.flatten() {
            let original = match self.node(idx) {
                Some(node) => node.data.text.clone(),
                // Detached earlier in this pass
                None => continue,
            };

            let mut text = original.clone();
            let mut deleted = false;
            for rule in rules.rules() {
                match rule(&text) {
                    RuleOutcome::Rewrite(new_text) => text = new_text,
                    RuleOutcome::Delete { keep_children } => {
                        self.delete(idx, keep_children)?;
                        report.deleted += 1;
                        deleted = true;
                        break;
                    }
                }
            }

            if !deleted && text != original {
                if let Some(node) = self.node_mut(idx) {
                    node.data.text = text;
                }
                report.rewritten += 1;
            }
        }
        Ok(report)
    }
}
