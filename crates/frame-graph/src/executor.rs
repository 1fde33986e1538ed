//! Frame graph execution
//!
//! A compiled graph only describes images and passes. An [`Executor`] backend turns
//! that description into real render targets, and [`FrameDriver`] sequences the
//! backend calls on resize and invokes the per-pass renderers every frame.

use crate::{CompiledGraph, FormatClass, FrameGraphError, ImageFormat, Result, graph::Extent};
use std::collections::HashMap;

/// Backend that owns the actual images and render targets
///
/// All names passed in are physical image names or pass names of the compiled graph.
pub trait Executor {
    /// Error reported by the backend
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates an image that passes render into
    fn generate_image(&mut self, name: &str, format: ImageFormat, width: u32, height: u32) -> std::result::Result<(), Self::Error>;

    /// Releases an image
    ///
    /// Called before a surface-sized image is regenerated, including the first time,
    /// so destroying an image that does not exist must succeed.
    fn destroy_image(&mut self, name: &str) -> std::result::Result<(), Self::Error>;

    /// Builds the render target of a pass from its output and sampled images
    ///
    /// Outputs carry their format so color and depth/stencil attachments can be
    /// grouped separately.
    fn build_render_target(&mut self, pass: &str, outputs: &[Attachment], inputs: &[String]) -> std::result::Result<(), Self::Error>;

    /// Releases the render target of a pass; a missing target must be ignored
    fn destroy_render_target(&mut self, pass: &str) -> std::result::Result<(), Self::Error>;

    /// Called before any image or render target is touched by a resize
    fn pre_resize(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called once every image and render target has been recreated
    fn post_resize(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// A physical image a pass renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Physical image name
    pub image: String,
    pub format: ImageFormat,
}

impl Attachment {
    /// Color or depth/stencil
    pub fn class(&self) -> FormatClass {
        self.format.class()
    }
}

/// Per-pass view handed to a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Pass being rendered
    pub pass: &'a str,
    /// Size of the images the pass renders into
    pub image_width: u32,
    pub image_height: u32,
    /// Area of the images the pass should cover
    pub renderable_width: u32,
    pub renderable_height: u32,
    /// Size of the output surface
    pub window_width: u32,
    pub window_height: u32,
    /// Physical images rendered into, in declaration order
    pub outputs: &'a [Attachment],
    /// Physical images sampled, in declaration order
    pub inputs: &'a [String],
    /// True when the pass follows the output surface size
    pub resizable: bool,
}

impl Frame<'_> {
    /// Presentation passes render straight to the output surface
    pub fn is_presentation(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Callback that records the commands of one pass
pub type Renderer = Box<dyn FnMut(&Frame<'_>)>;

/// Render target bindings of a pass, resolved at resize time
#[derive(Debug, Clone)]
struct BoundPass {
    name: String,
    extent: Extent,
    outputs: Vec<Attachment>,
    inputs: Vec<String>,
}

fn backend_error<E: std::error::Error + Send + Sync + 'static>(error: E) -> FrameGraphError {
    FrameGraphError::Executor(Box::new(error))
}

/// Drives an [`Executor`] through a compiled graph
pub struct FrameDriver<E: Executor> {
    backend: E,
    graph: CompiledGraph,
    renderers: HashMap<String, Renderer>,
    /// Passes in execution order, empty until the first resize
    bound: Vec<BoundPass>,
    /// Output surface size of the last successful resize
    window: Option<Extent>,
    /// Set once the backend may hold images or render targets of `graph`
    allocated: bool,
}

impl<E: Executor> FrameDriver<E> {
    /// Creates a driver; nothing is allocated until [`FrameDriver::resize`]
    pub fn new(backend: E, graph: CompiledGraph) -> Self {
        Self {
            backend,
            graph,
            renderers: HashMap::new(),
            bound: Vec::new(),
            window: None,
            allocated: false,
        }
    }

    /// Attaches the renderer invoked for `pass` every frame, replacing any previous one
    ///
    /// # Errors
    /// [`FrameGraphError::UnknownNode`] if the compiled graph has no such pass
    pub fn set_renderer<F>(&mut self, pass: &str, renderer: F) -> Result<()>
    where
        F: FnMut(&Frame<'_>) + 'static,
    {
        if self.graph.pass(pass).is_none() {
            return Err(FrameGraphError::UnknownNode(pass.to_string()));
        }
        self.renderers.insert(pass.to_string(), Box::new(renderer));
        Ok(())
    }

    /// Recreates images and render targets for a new output surface size
    ///
    /// Surface-sized images are destroyed and generated at the new size; fixed-size
    /// images are generated again at their declared size. Every pass then gets its
    /// render target rebuilt, in execution order.
    ///
    /// If the backend fails part way, frames are refused with
    /// [`FrameGraphError::NotResized`] until a later resize succeeds.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let window = Extent { width, height };
        tracing::debug!("Resizing frame graph to {}x{}", width, height);

        self.window = None;
        self.bound.clear();
        self.allocated = true;

        self.backend.pre_resize().map_err(backend_error)?;

        for image in self.graph.images().values() {
            let extent = image.extent().resolve(window);
            if image.resizable {
                self.backend.destroy_image(&image.name).map_err(backend_error)?;
            }
            self.backend.generate_image(&image.name, image.format, extent.width, extent.height).map_err(backend_error)?;
        }

        let bound = self.bind_passes()?;
        for pass in &bound {
            self.backend.destroy_render_target(&pass.name).map_err(backend_error)?;
            self.backend.build_render_target(&pass.name, &pass.outputs, &pass.inputs).map_err(backend_error)?;
        }

        self.backend.post_resize().map_err(backend_error)?;

        self.bound = bound;
        self.window = Some(window);
        Ok(())
    }

    fn bind_passes(&self) -> Result<Vec<BoundPass>> {
        self.graph
            .ordered_passes()
            .map(|pass| -> Result<BoundPass> {
                let outputs = pass
                    .outputs
                    .iter()
                    .map(|output| -> Result<Attachment> {
                        let image = self.graph.image_of(&output.name).ok_or_else(|| FrameGraphError::UnknownNode(output.name.clone()))?;
                        Ok(Attachment {
                            image: image.name.clone(),
                            format: image.format,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let inputs = self.graph.input_images(&pass.name).ok_or_else(|| FrameGraphError::UnknownNode(pass.name.clone()))?;
                Ok(BoundPass {
                    name: pass.name.clone(),
                    extent: pass.extent,
                    outputs,
                    inputs: inputs.into_iter().map(str::to_string).collect(),
                })
            })
            .collect()
    }

    /// Invokes every renderer once, in execution order
    ///
    /// # Errors
    /// * [`FrameGraphError::NotResized`] before the first resize
    /// * [`FrameGraphError::MissingRenderer`] if a pass has no renderer; no renderer
    ///   runs in that case
    pub fn execute(&mut self) -> Result<()> {
        let Some(window) = self.window else {
            tracing::warn!("Skipping frame: frame graph has not been resized");
            return Err(FrameGraphError::NotResized);
        };

        if let Some(pass) = self.bound.iter().find(|pass| !self.renderers.contains_key(&pass.name)) {
            return Err(FrameGraphError::MissingRenderer(pass.name.clone()));
        }

        for pass in &self.bound {
            let Some(renderer) = self.renderers.get_mut(&pass.name) else {
                continue;
            };

            let presentation = pass.outputs.is_empty();
            let image = if presentation { window } else { pass.extent.resolve(window) };
            let frame = Frame {
                pass: &pass.name,
                image_width: image.width,
                image_height: image.height,
                renderable_width: image.width,
                renderable_height: image.height,
                window_width: window.width,
                window_height: window.height,
                outputs: &pass.outputs,
                inputs: &pass.inputs,
                resizable: presentation || pass.extent.is_surface_sized(),
            };
            renderer(&frame);
        }
        Ok(())
    }

    /// Releases every render target and image created for the current graph
    pub fn destroy(&mut self) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        self.window = None;
        self.bound.clear();

        for pass in self.graph.execution_order() {
            self.backend.destroy_render_target(pass).map_err(backend_error)?;
        }
        for name in self.graph.images().keys() {
            self.backend.destroy_image(name).map_err(backend_error)?;
        }
        self.allocated = false;
        Ok(())
    }

    /// Swaps in a recompiled graph
    ///
    /// Resources of the previous graph are released. If the driver was already
    /// resized, the new graph is allocated at the same surface size right away.
    /// Renderers of passes that no longer exist are dropped.
    pub fn rebuild(&mut self, graph: CompiledGraph) -> Result<()> {
        let window = self.window;
        self.destroy()?;

        self.graph = graph;
        let graph = &self.graph;
        self.renderers.retain(|pass, _| graph.pass(pass).is_some());
        tracing::info!("Rebuilt frame graph with {} passes and {} images", self.graph.execution_order().len(), self.graph.images().len());

        match window {
            Some(window) => self.resize(window.width, window.height),
            None => Ok(()),
        }
    }

    /// The compiled graph being driven
    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }

    pub fn backend(&self) -> &E {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut E {
        &mut self.backend
    }

    /// Output surface size of the last resize
    pub fn window_extent(&self) -> Option<Extent> {
        self.window
    }

    /// Releases the graph resources and returns the backend
    pub fn into_backend(mut self) -> Result<E> {
        self.destroy()?;
        Ok(self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameGraph;
    use std::{cell::RefCell, rc::Rc};

    const RGBA: ImageFormat = ImageFormat::R8G8B8A8Unorm;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        PreResize,
        PostResize,
        Generate(String, ImageFormat, u32, u32),
        Destroy(String),
        Build(String, Vec<Attachment>, Vec<String>),
        DestroyTarget(String),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("backend refused image '{0}'")]
    struct Refused(String);

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Vec<Call>,
        refuse: Option<String>,
    }

    impl Executor for RecordingExecutor {
        type Error = Refused;

        fn generate_image(&mut self, name: &str, format: ImageFormat, width: u32, height: u32) -> std::result::Result<(), Refused> {
            if self.refuse.as_deref() == Some(name) {
                return Err(Refused(name.to_string()));
            }
            self.calls.push(Call::Generate(name.to_string(), format, width, height));
            Ok(())
        }

        fn destroy_image(&mut self, name: &str) -> std::result::Result<(), Refused> {
            self.calls.push(Call::Destroy(name.to_string()));
            Ok(())
        }

        fn build_render_target(&mut self, pass: &str, outputs: &[Attachment], inputs: &[String]) -> std::result::Result<(), Refused> {
            self.calls.push(Call::Build(pass.to_string(), outputs.to_vec(), inputs.to_vec()));
            Ok(())
        }

        fn destroy_render_target(&mut self, pass: &str) -> std::result::Result<(), Refused> {
            self.calls.push(Call::DestroyTarget(pass.to_string()));
            Ok(())
        }

        fn pre_resize(&mut self) -> std::result::Result<(), Refused> {
            self.calls.push(Call::PreResize);
            Ok(())
        }

        fn post_resize(&mut self) -> std::result::Result<(), Refused> {
            self.calls.push(Call::PostResize);
            Ok(())
        }
    }

    fn blur_graph() -> CompiledGraph {
        let mut graph = FrameGraph::new();
        let geometry = graph.create_pass("geometryPass").unwrap();
        graph.output(geometry, "C1", RGBA);
        let blur = graph.create_pass("HBlur1").unwrap();
        graph.set_extent(blur, 256, 256).input(blur, "C1").output(blur, "B1h", RGBA);
        let last = graph.create_pass("Final").unwrap();
        graph.input(last, "B1h").input(last, "C1");
        graph.compile().unwrap()
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn color(image: &str) -> Attachment {
        Attachment {
            image: image.to_string(),
            format: RGBA,
        }
    }

    #[test]
    fn test_resize_call_sequence() {
        let mut driver = FrameDriver::new(RecordingExecutor::default(), blur_graph());
        driver.resize(1920, 1080).unwrap();

        let expected = vec![
            Call::PreResize,
            Call::Generate("B1h_img".to_string(), RGBA, 256, 256),
            Call::Destroy("C1_img".to_string()),
            Call::Generate("C1_img".to_string(), RGBA, 1920, 1080),
            Call::DestroyTarget("geometryPass".to_string()),
            Call::Build("geometryPass".to_string(), vec![color("C1_img")], vec![]),
            Call::DestroyTarget("HBlur1".to_string()),
            Call::Build("HBlur1".to_string(), vec![color("B1h_img")], strings(&["C1_img"])),
            Call::DestroyTarget("Final".to_string()),
            Call::Build("Final".to_string(), vec![], strings(&["B1h_img", "C1_img"])),
            Call::PostResize,
        ];
        assert_eq!(driver.backend().calls, expected);
        assert_eq!(driver.window_extent(), Some(Extent::new(1920, 1080)));
    }

    #[test]
    fn test_render_targets_separate_depth_attachments() {
        let compiled = crate::presets::Preset::GeometryFinal.build().unwrap().compile().unwrap();
        let mut driver = FrameDriver::new(RecordingExecutor::default(), compiled);
        driver.resize(640, 480).unwrap();

        let outputs = driver
            .backend()
            .calls
            .iter()
            .find_map(|call| match call {
                Call::Build(pass, outputs, _) if pass == "geometryPass" => Some(outputs.clone()),
                _ => None,
            })
            .unwrap();
        let classes: Vec<_> = outputs.iter().map(Attachment::class).collect();
        assert_eq!(classes, vec![FormatClass::Color, FormatClass::DepthStencil]);
        assert_eq!(outputs[1].image, "D1_img");
    }

    #[test]
    fn test_execute_hands_out_frames_in_order() {
        let mut driver = FrameDriver::new(RecordingExecutor::default(), blur_graph());
        let seen = Rc::new(RefCell::new(Vec::new()));
        for pass in ["geometryPass", "HBlur1", "Final"] {
            let seen = Rc::clone(&seen);
            driver
                .set_renderer(pass, move |frame| {
                    seen.borrow_mut().push((frame.pass.to_string(), frame.image_width, frame.image_height, frame.is_presentation(), frame.resizable));
                })
                .unwrap();
        }

        driver.resize(800, 600).unwrap();
        driver.execute().unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                ("geometryPass".to_string(), 800, 600, false, true),
                ("HBlur1".to_string(), 256, 256, false, false),
                ("Final".to_string(), 800, 600, true, true),
            ]
        );
    }

    #[test]
    fn test_execute_requires_resize_and_renderers() {
        let mut driver = FrameDriver::new(RecordingExecutor::default(), blur_graph());
        assert!(matches!(driver.execute(), Err(FrameGraphError::NotResized)));

        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        driver.set_renderer("geometryPass", move |_| *counter.borrow_mut() += 1).unwrap();
        driver.resize(640, 480).unwrap();

        let err = driver.execute().unwrap_err();
        assert!(matches!(err, FrameGraphError::MissingRenderer(pass) if pass == "HBlur1"));
        assert_eq!(*calls.borrow(), 0);

        assert!(matches!(driver.set_renderer("C1", |_| {}), Err(FrameGraphError::UnknownNode(_))));
    }

    #[test]
    fn test_backend_errors_are_boxed() {
        let backend = RecordingExecutor {
            refuse: Some("C1_img".to_string()),
            ..Default::default()
        };
        let mut driver = FrameDriver::new(backend, blur_graph());

        let err = driver.resize(1280, 720).unwrap_err();
        assert!(matches!(&err, FrameGraphError::Executor(source) if source.to_string() == "backend refused image 'C1_img'"));
        assert_eq!(driver.window_extent(), None);
    }

    #[test]
    fn test_failed_resize_refuses_frames() {
        let mut driver = FrameDriver::new(RecordingExecutor::default(), blur_graph());
        for pass in ["geometryPass", "HBlur1", "Final"] {
            driver.set_renderer(pass, |_| {}).unwrap();
        }
        driver.resize(800, 600).unwrap();
        driver.execute().unwrap();

        driver.backend_mut().refuse = Some("C1_img".to_string());
        assert!(driver.resize(1024, 768).is_err());
        assert_eq!(driver.window_extent(), None);
        // C1_img was destroyed before the failure; its old name must not reach a renderer
        assert!(matches!(driver.execute(), Err(FrameGraphError::NotResized)));

        driver.backend_mut().refuse = None;
        driver.backend_mut().calls.clear();
        let backend = driver.into_backend().unwrap();
        assert!(backend.calls.contains(&Call::DestroyTarget("Final".to_string())));
        assert!(backend.calls.contains(&Call::Destroy("C1_img".to_string())));
    }

    #[test]
    fn test_rebuild_reallocates_at_current_size() {
        let mut driver = FrameDriver::new(RecordingExecutor::default(), blur_graph());
        driver.set_renderer("geometryPass", |_| {}).unwrap();
        driver.set_renderer("HBlur1", |_| {}).unwrap();
        driver.resize(1024, 768).unwrap();
        driver.backend_mut().calls.clear();

        let mut graph = FrameGraph::new();
        let geometry = graph.create_pass("geometryPass").unwrap();
        graph.output(geometry, "C1", RGBA);
        let last = graph.create_pass("Final").unwrap();
        graph.input(last, "C1");
        driver.rebuild(graph.compile().unwrap()).unwrap();

        let calls = &driver.backend().calls;
        assert_eq!(calls[..3], [Call::DestroyTarget("geometryPass".to_string()), Call::DestroyTarget("HBlur1".to_string()), Call::DestroyTarget("Final".to_string())]);
        assert!(calls.contains(&Call::Destroy("B1h_img".to_string())));
        assert!(calls.contains(&Call::Generate("C1_img".to_string(), RGBA, 1024, 768)));
        assert_eq!(calls.last(), Some(&Call::PostResize));

        // HBlur1's renderer went away with the pass
        assert!(matches!(driver.execute(), Err(FrameGraphError::MissingRenderer(pass)) if pass == "Final"));
    }

    #[test]
    fn test_destroy_before_resize_is_a_no_op() {
        let driver = FrameDriver::new(RecordingExecutor::default(), blur_graph());
        let backend = driver.into_backend().unwrap();
        assert!(backend.calls.is_empty());
    }
}
