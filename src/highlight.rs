//! Pointer-focus emphasis over path and group tags.
//!
//! The controller never touches drawing primitives. It turns a focus event
//! into the tag set to emphasise and tells the caller which paths were
//! touched; unfocus always clears every tag, whatever was focused before.

use crate::ir::{NodeRef, PathId};
use crate::layout::Layout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub const HIGHLIGHT_CLASS: &str = "highlighting";
pub const HIGHLIGHT_GROUP_CLASS: &str = "highlighting_group";
/// Element classes put back above the mask when emphasis clears.
pub const RAISED_CLASSES: [&str; 2] = ["group-rect", "group-label"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
    Group,
}

/// The diagram element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget<'a> {
    Node(NodeRef),
    Edge(&'a str),
    Group { row: usize, index: usize },
}

/// A resolved focus: the tags to emphasise and the paths behind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Focus {
    pub kind: ElementKind,
    pub tags: Vec<String>,
    pub is_group: bool,
    pub paths: Vec<PathId>,
}

impl Focus {
    /// Class selector matching every element that carries one of the tags.
    pub fn selector(&self) -> String {
        self.tags
            .iter()
            .map(|tag| format!(".{tag}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Builds a focus from a renderer-supplied selector such as `.pcA,.pcB`.
    pub fn from_selector(layout: &Layout, kind: ElementKind, selector: &str, is_group: bool) -> Self {
        let tags = dedup(
            selector
                .split(',')
                .map(|part| part.trim().trim_start_matches('.'))
                .filter(|tag| !tag.is_empty())
                .map(str::to_string),
        );
        let paths = dedup(
            tags.iter()
                .flat_map(|tag| layout.paths_for_tag(tag).iter().copied()),
        );
        Self {
            kind,
            tags,
            is_group,
            paths,
        }
    }
}

fn dedup<T: Ord + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Resolves the element under the pointer. Returns `None` when the target
/// does not exist in `layout` (for example after a rebuild).
pub fn resolve_focus(layout: &Layout, target: FocusTarget<'_>) -> Option<Focus> {
    match target {
        FocusTarget::Node(node) => {
            let placed = layout.node(&node)?;
            Some(single_path(layout, ElementKind::Node, &placed.path_tag))
        }
        FocusTarget::Edge(identity) => {
            let relation = layout.relation(identity)?;
            Some(single_path(layout, ElementKind::Edge, &relation.path_tag))
        }
        FocusTarget::Group { row, index } => {
            let group = layout.group(row, index)?;
            Some(Focus {
                kind: ElementKind::Group,
                tags: dedup(group.tags.iter().cloned()),
                is_group: true,
                paths: dedup(group.paths.iter().copied()),
            })
        }
    }
}

// Identical paths share a tag, so a single-path focus may touch several.
fn single_path(layout: &Layout, kind: ElementKind, tag: &str) -> Focus {
    Focus {
        kind,
        tags: vec![tag.to_string()],
        is_group: false,
        paths: layout.paths_for_tag(tag).to_vec(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Idle,
    Emphasized {
        selector: String,
        is_group: bool,
    },
}

/// Instruction for the renderer, produced by every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Transition {
    #[serde(rename_all = "camelCase")]
    Emphasize {
        selector: String,
        class: &'static str,
        tags: Vec<String>,
        paths: Vec<PathId>,
        mask_opacity: f32,
    },
    #[serde(rename_all = "camelCase")]
    Clear {
        classes: [&'static str; 2],
        raise: [&'static str; 2],
        mask_opacity: f32,
    },
}

/// Receives the paths touched by each focus, e.g. to fill a side panel.
pub trait PathObserver {
    fn on_over_path(&mut self, paths: &[PathId]);
}

impl<F> PathObserver for F
where
    F: FnMut(&[PathId]),
{
    fn on_over_path(&mut self, paths: &[PathId]) {
        self(paths)
    }
}

fn ignore_paths(_: &[PathId]) {}

/// Snapshot of what is currently emphasised.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Emphasis {
    pub path_tags: BTreeSet<String>,
    pub group_tags: BTreeSet<String>,
    pub mask_opacity: f32,
}

impl Emphasis {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.path_tags.is_empty() && self.group_tags.is_empty()
    }

    /// Emphasis classes an element with `tags` should carry.
    pub fn classes_for<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if tags.iter().any(|tag| self.path_tags.contains(tag.as_ref())) {
            classes.push(HIGHLIGHT_CLASS);
        }
        if tags.iter().any(|tag| self.group_tags.contains(tag.as_ref())) {
            classes.push(HIGHLIGHT_GROUP_CLASS);
        }
        classes
    }
}

pub struct HighlightController<O = fn(&[PathId])> {
    state: HighlightState,
    path_tags: BTreeSet<String>,
    group_tags: BTreeSet<String>,
    mask_opacity: f32,
    emphasis_opacity: f32,
    observer: O,
}

impl HighlightController {
    /// A controller nobody listens to.
    pub fn detached(emphasis_opacity: f32) -> Self {
        Self::new(emphasis_opacity, ignore_paths)
    }
}

impl<O: PathObserver> HighlightController<O> {
    pub fn new(emphasis_opacity: f32, observer: O) -> Self {
        Self {
            state: HighlightState::Idle,
            path_tags: BTreeSet::new(),
            group_tags: BTreeSet::new(),
            mask_opacity: 0.0,
            emphasis_opacity: emphasis_opacity.clamp(0.0, 1.0),
            observer,
        }
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn on_focus(&mut self, focus: &Focus) -> Transition {
        let (class, tags) = if focus.is_group {
            (HIGHLIGHT_GROUP_CLASS, &mut self.group_tags)
        } else {
            (HIGHLIGHT_CLASS, &mut self.path_tags)
        };
        tags.extend(focus.tags.iter().cloned());

        let selector = focus.selector();
        self.mask_opacity = self.emphasis_opacity;
        self.state = HighlightState::Emphasized {
            selector: selector.clone(),
            is_group: focus.is_group,
        };
        debug!(
            kind = ?focus.kind,
            tags = focus.tags.len(),
            paths = focus.paths.len(),
            "emphasizing"
        );
        self.observer.on_over_path(&focus.paths);

        Transition::Emphasize {
            selector,
            class,
            tags: focus.tags.clone(),
            paths: focus.paths.clone(),
            mask_opacity: self.mask_opacity,
        }
    }

    /// Renderer-facing entry point taking the raw selector of the element.
    pub fn on_focus_selector(
        &mut self,
        layout: &Layout,
        kind: ElementKind,
        selector: &str,
        is_group: bool,
    ) -> Transition {
        let focus = Focus::from_selector(layout, kind, selector, is_group);
        self.on_focus(&focus)
    }

    /// Clears every emphasised tag, regardless of which element was focused.
    pub fn on_unfocus(&mut self) -> Transition {
        self.path_tags.clear();
        self.group_tags.clear();
        self.mask_opacity = 0.0;
        self.state = HighlightState::Idle;
        Transition::Clear {
            classes: [HIGHLIGHT_CLASS, HIGHLIGHT_GROUP_CLASS],
            raise: RAISED_CLASSES,
            mask_opacity: 0.0,
        }
    }

    pub fn is_emphasized(&self, tag: &str) -> bool {
        self.path_tags.contains(tag) || self.group_tags.contains(tag)
    }

    pub fn emphasis(&self) -> Emphasis {
        Emphasis {
            path_tags: self.path_tags.clone(),
            group_tags: self.group_tags.clone(),
            mask_opacity: self.mask_opacity,
        }
    }
}
