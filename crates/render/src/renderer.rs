use tableau_scene::{Scene, SceneNode};

use crate::view::RenderView;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view configuration, then
/// produces output. It never mutates the scene; scene truth is owned
/// by the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Text renderer standing in for a GPU backend.
///
/// Produces a human-readable string representation of the scene.
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Scene ({} objects) ===\n", scene.len()));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        for (id, object) in scene.iter() {
            match &object.node {
                SceneNode::Single(t) => {
                    out.push_str(&format!(
                        "  [{:.8}] {} pos=({:.2}, {:.2}, {:.2})\n",
                        &id.0.to_string()[..8],
                        object.name,
                        t.position.x,
                        t.position.y,
                        t.position.z
                    ));
                }
                SceneNode::Instanced(instances) => {
                    out.push_str(&format!(
                        "  [{:.8}] {} x{} instances\n",
                        &id.0.to_string()[..8],
                        object.name,
                        instances.len()
                    ));
                    for instance in instances {
                        let p = instance.transform.position;
                        out.push_str(&format!(
                            "    - [{:.8}] pos=({:.2}, {:.2}, {:.2})\n",
                            &instance.id.0.to_string()[..8],
                            p.x,
                            p.y,
                            p.z
                        ));
                    }
                }
            }
        }

        out
    }
}
