//! Tweakable-control registry: named groups of controls that hosts can
//! enumerate, toggle, and write through.
//!
//! # Invariants
//! - Groups are created lazily and start hidden; visibility is a
//!   presentation concern and never gates writes.
//! - Control values live in the owning object's [`ControlSet`]; the
//!   registry stores presentation metadata only.
//! - A registered object's controls are built once, when the object
//!   batch is initialized, after physics bodies exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tableau_common::ObjectId;

use crate::behavior::BehaviorMap;

/// Name of the group reserved for runtime diagnostics controls.
pub const DEV_GROUP: &str = "dev";

/// A tunable parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControlValue {
    Bool(bool),
    Scalar(f32),
    Color([f32; 3]),
}

/// Parameter name to current value, owned by the object it tunes.
pub type ControlSet = BTreeMap<String, ControlValue>;

/// How a control is presented to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Toggle,
    Slider { min: f32, max: f32 },
    Color,
}

/// One registered control: presentation metadata plus the object whose
/// control set it writes into.
#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub kind: ControlKind,
    pub(crate) object: ObjectId,
}

/// A named group of controls with a visibility flag.
#[derive(Debug, Default)]
pub struct Group {
    pub visible: bool,
    pub controls: Vec<Control>,
}

/// The control registry.
pub struct Gui {
    groups: BTreeMap<String, Group>,
    pending: Vec<ObjectId>,
}

impl Gui {
    pub fn new() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(DEV_GROUP.to_string(), Group::default());
        Self {
            groups,
            pending: Vec::new(),
        }
    }

    /// Queue an object whose controls are built on the next `init`.
    pub(crate) fn enqueue(&mut self, id: ObjectId) {
        self.pending.push(id);
    }

    /// Builds controls for every queued tweakable object.
    pub(crate) fn init(&mut self, behaviors: &BehaviorMap) {
        for id in std::mem::take(&mut self.pending) {
            let Some(behavior) = behaviors.get(&id).cloned() else {
                continue;
            };
            let mut behavior = behavior.borrow_mut();
            let Some(tweakable) = behavior.as_tweakable() else {
                continue;
            };
            let mut ctx = GuiContext {
                gui: self,
                object: id,
            };
            tweakable.update_gui(&mut ctx);
            tracing::debug!(object = %id.0, "built gui controls");
        }
    }

    fn group_entry(&mut self, name: &str) -> &mut Group {
        self.groups.entry(name.to_string()).or_default()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Deterministic iteration over groups by name.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    /// Toggle a group's visibility. Returns `false` if no such group.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.groups.get_mut(name) {
            Some(group) => {
                group.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Look up a control by group and name.
    pub fn find(&self, group: &str, name: &str) -> Option<&Control> {
        self.groups
            .get(group)?
            .controls
            .iter()
            .find(|control| control.name == name)
    }
}

impl Default for Gui {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder handed to a tweakable object's `update_gui` hook, scoped to
/// that object.
pub struct GuiContext<'a> {
    gui: &'a mut Gui,
    object: ObjectId,
}

impl GuiContext<'_> {
    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    /// Register a control inside `group` (created hidden if absent),
    /// bound to the entry of the same name in the object's control set.
    pub fn add_control(&mut self, group: &str, name: &str, kind: ControlKind) {
        self.gui.group_entry(group).controls.push(Control {
            name: name.to_string(),
            kind,
            object: self.object,
        });
    }

    pub fn show_group(&mut self, group: &str, visible: bool) {
        self.gui.group_entry(group).visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Behavior, Tweakable, shared};

    struct Dial {
        controls: ControlSet,
    }

    impl Behavior for Dial {
        fn as_tweakable(&mut self) -> Option<&mut dyn Tweakable> {
            Some(self)
        }
    }

    impl Tweakable for Dial {
        fn update_gui(&mut self, ctx: &mut GuiContext<'_>) {
            ctx.add_control(
                "dial",
                "speed",
                ControlKind::Slider { min: 0.0, max: 2.0 },
            );
            ctx.add_control(DEV_GROUP, "wireframe", ControlKind::Toggle);
            ctx.show_group("dial", true);
        }

        fn control_set(&mut self) -> &mut ControlSet {
            &mut self.controls
        }
    }

    #[test]
    fn dev_group_exists_and_starts_hidden() {
        let gui = Gui::new();
        let dev = gui.group(DEV_GROUP).unwrap();
        assert!(!dev.visible);
        assert!(dev.controls.is_empty());
    }

    #[test]
    fn init_builds_controls_once() {
        let mut gui = Gui::new();
        let mut behaviors = BehaviorMap::new();
        let id = ObjectId::new();
        behaviors.insert(
            id,
            shared(Dial {
                controls: ControlSet::new(),
            }),
        );
        gui.enqueue(id);
        gui.init(&behaviors);

        assert!(gui.find("dial", "speed").is_some());
        assert_eq!(gui.group(DEV_GROUP).unwrap().controls.len(), 1);
        assert!(gui.group("dial").unwrap().visible);

        // Queue drained; a second init adds nothing.
        gui.init(&behaviors);
        assert_eq!(gui.group("dial").unwrap().controls.len(), 1);
    }

    #[test]
    fn lazily_created_groups_start_hidden() {
        let mut gui = Gui::new();
        let mut ctx = GuiContext {
            gui: &mut gui,
            object: ObjectId::new(),
        };
        ctx.add_control("colors", "tint", ControlKind::Color);
        assert!(!gui.group("colors").unwrap().visible);
    }

    #[test]
    fn visibility_toggle_reports_missing_groups() {
        let mut gui = Gui::new();
        assert!(gui.set_visible(DEV_GROUP, true));
        assert!(gui.group(DEV_GROUP).unwrap().visible);
        assert!(!gui.set_visible("nope", true));
    }
}
