//! Gradient-boosted tree ensemble evaluation.
//!
//! Reads the XGBoost JSON dump layout (nested split/leaf nodes) and flattens
//! each tree into an index-addressed node array. Each tree contributes its
//! leaf value to the margin of class `tree_index % num_class`; margins are
//! turned into probabilities with softmax (multi-class) or sigmoid (binary).

use std::collections::HashMap;
use std::path::Path;

use arrow::array::{Array, Float64Array};
use arrow::record_batch::RecordBatch;
use serde::Deserialize;
use tracing::info;

use crate::artifacts::read_artifact;
use crate::{ColumnList, ModelError};

/// Learning objective the ensemble was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Objective {
    #[serde(rename = "multi:softprob")]
    MultiSoftprob,
    #[serde(rename = "multi:softmax")]
    MultiSoftmax,
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultiSoftprob => "multi:softprob",
            Self::MultiSoftmax => "multi:softmax",
            Self::BinaryLogistic => "binary:logistic",
        }
    }
}

// ── Artifact layout ──

#[derive(Deserialize)]
struct ModelFile {
    objective: Objective,
    #[serde(default)]
    num_class: Option<usize>,
    #[serde(default)]
    base_score: Option<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<DumpNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DumpNode {
    Split {
        nodeid: u32,
        split: String,
        split_condition: f64,
        yes: u32,
        no: u32,
        missing: u32,
        children: Vec<DumpNode>,
    },
    Leaf {
        nodeid: u32,
        leaf: f64,
    },
}

impl DumpNode {
    fn id(&self) -> u32 {
        match self {
            Self::Split { nodeid, .. } | Self::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

// ── Flattened trees ──

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f64),
}

/// One regression tree. Node 0 is the root; child indices always point
/// past their parent, so traversal terminates.
#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let x = features.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x.is_nan() {
                        *missing
                    } else if x < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// Builds the flat node array for one dumped tree.
struct TreeBuilder<'a> {
    columns: &'a ColumnList,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Append `node` and its subtree, returning the index it landed at.
    fn push(&mut self, node: &DumpNode) -> Result<usize, ModelError> {
        let idx = self.nodes.len();
        match node {
            DumpNode::Leaf { leaf, .. } => {
                self.nodes.push(Node::Leaf(*leaf));
            }
            DumpNode::Split {
                nodeid,
                split,
                split_condition,
                yes,
                no,
                missing,
                children,
            } => {
                let feature = resolve_feature(split, self.columns)?;
                // Placeholder until the children have been placed.
                self.nodes.push(Node::Leaf(0.0));

                let mut placed: HashMap<u32, usize> = HashMap::with_capacity(children.len());
                for child in children {
                    let child_idx = self.push(child)?;
                    placed.insert(child.id(), child_idx);
                }

                let lookup = |target: &u32| {
                    placed.get(target).copied().ok_or_else(|| {
                        ModelError::Artifact(format!(
                            "node {nodeid} branches to {target}, which is not one of its children"
                        ))
                    })
                };

                self.nodes[idx] = Node::Split {
                    feature,
                    threshold: *split_condition,
                    yes: lookup(yes)?,
                    no: lookup(no)?,
                    missing: lookup(missing)?,
                };
            }
        }
        Ok(idx)
    }
}

/// Map a split feature (column name or `f<index>`) to its vector slot.
fn resolve_feature(split: &str, columns: &ColumnList) -> Result<usize, ModelError> {
    if let Some(idx) = columns.position(split) {
        return Ok(idx);
    }
    if let Some(idx) = split
        .strip_prefix('f')
        .and_then(|digits| digits.parse::<usize>().ok())
        && idx < columns.len()
    {
        return Ok(idx);
    }
    Err(ModelError::Artifact(format!(
        "split feature {split:?} is not in the column list"
    )))
}

// ── Booster ──

/// A loaded boosted tree ensemble.
#[derive(Debug, Clone)]
pub struct Booster {
    objective: Objective,
    num_class: usize,
    base_margin: f64,
    num_features: usize,
    trees: Vec<Tree>,
}

impl Booster {
    /// Parse a model artifact, resolving split features against `columns`.
    pub fn from_json(json: &str, columns: &ColumnList) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(json)?;

        if let Some(names) = &file.feature_names
            && names.as_slice() != columns.names()
        {
            return Err(ModelError::Artifact(format!(
                "model was trained on {} features that do not match the {} listed columns",
                names.len(),
                columns.len()
            )));
        }

        let num_class = match file.objective {
            Objective::BinaryLogistic => 2,
            Objective::MultiSoftprob | Objective::MultiSoftmax => match file.num_class {
                Some(n) if n >= 2 => n,
                other => {
                    return Err(ModelError::Artifact(format!(
                        "{} needs num_class >= 2, got {other:?}",
                        file.objective.as_str()
                    )));
                }
            },
        };

        let base_score = file.base_score.unwrap_or(0.5);
        let base_margin = match file.objective {
            Objective::BinaryLogistic => {
                if !(base_score > 0.0 && base_score < 1.0) {
                    return Err(ModelError::Artifact(format!(
                        "binary:logistic base_score must lie in (0, 1), got {base_score}"
                    )));
                }
                (base_score / (1.0 - base_score)).ln()
            }
            _ => base_score,
        };

        let mut trees = Vec::with_capacity(file.trees.len());
        for root in &file.trees {
            let mut builder = TreeBuilder {
                columns,
                nodes: Vec::new(),
            };
            builder.push(root)?;
            trees.push(Tree {
                nodes: builder.nodes,
            });
        }

        Ok(Self {
            objective: file.objective,
            num_class,
            base_margin,
            num_features: columns.len(),
            trees,
        })
    }

    pub fn load(path: &Path, columns: &ColumnList) -> Result<Self, ModelError> {
        let booster = Self::from_json(&read_artifact(path)?, columns)?;
        info!(
            path = %path.display(),
            objective = booster.objective.as_str(),
            classes = booster.num_class,
            trees = booster.trees.len(),
            "loaded boosted tree model"
        );
        Ok(booster)
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Number of classes the model distinguishes (2 for binary models).
    pub fn num_class(&self) -> usize {
        self.num_class
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw per-class margins. Binary models have a single margin.
    pub fn margins(&self, features: &[f64]) -> Vec<f64> {
        let groups = self.margin_groups();
        let mut margins = vec![self.base_margin; groups];
        for (i, tree) in self.trees.iter().enumerate() {
            margins[i % groups] += tree.leaf_value(features);
        }
        margins
    }

    /// Class probabilities; always `num_class` entries summing to 1.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let margins = self.margins(features);
        match self.objective {
            Objective::BinaryLogistic => {
                let p = sigmoid(margins[0]);
                vec![1.0 - p, p]
            }
            Objective::MultiSoftprob | Objective::MultiSoftmax => softmax(&margins),
        }
    }

    /// Index of the most probable class (first wins on ties).
    pub fn predict(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba(features))
    }

    /// Probabilities for every row of a batch of Float64 feature columns,
    /// read positionally.
    pub fn predict_batch(&self, batch: &RecordBatch) -> Result<Vec<Vec<f64>>, ModelError> {
        if batch.num_columns() != self.num_features {
            return Err(ModelError::Artifact(format!(
                "batch has {} columns, model expects {}",
                batch.num_columns(),
                self.num_features
            )));
        }

        let columns = batch
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| {
                col.as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| ModelError::Artifact(format!("column {i} is not Float64")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut row = vec![0.0f64; self.num_features];
        let mut out = Vec::with_capacity(batch.num_rows());
        for r in 0..batch.num_rows() {
            for (slot, col) in row.iter_mut().zip(&columns) {
                *slot = if col.is_null(r) { f64::NAN } else { col.value(r) };
            }
            out.push(self.predict_proba(&row));
        }
        Ok(out)
    }

    fn margin_groups(&self) -> usize {
        match self.objective {
            Objective::BinaryLogistic => 1,
            _ => self.num_class,
        }
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
