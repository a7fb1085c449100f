//! Recording GL context for tests
//!
//! [`MockContext`] implements [`GlContext`] without a GPU. It hands out integer names, tracks
//! which objects are alive, what is bound, what storage every object has and what is attached to
//! every framebuffer, and answers completeness queries the way a driver would for that state.
//! Failures can be injected to exercise error paths.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{gl, GlContext};

/// Object attached to a framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockObject {
    Texture(u32),
    Renderbuffer(u32),
}

/// Level 0 image specified with `tex_image_2d`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureImage {
    pub internal_format: i32,
    pub width: i32,
    pub height: i32,
    pub format: u32,
    pub ty: u32,
}

/// Storage specified with `renderbuffer_storage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderbufferStorage {
    pub internal_format: u32,
    pub width: i32,
    pub height: i32,
}

#[derive(Default)]
struct FramebufferState {
    attachments: BTreeMap<u32, MockObject>,
    draw_buffers: Option<Vec<u32>>,
}

#[derive(Default)]
struct TextureState {
    image: Option<TextureImage>,
    parameters: HashMap<u32, i32>,
}

#[derive(Default)]
struct State {
    next_name: u32,
    framebuffers: HashMap<u32, FramebufferState>,
    renderbuffers: HashMap<u32, Option<RenderbufferStorage>>,
    textures: HashMap<u32, TextureState>,
    bound_framebuffer: Option<u32>,
    bound_renderbuffer: Option<u32>,
    bound_texture: Option<u32>,
    viewport: (i32, i32, i32, i32),
    forced_status: Option<u32>,
    creation_budget: Option<usize>,
    calls: usize,
    allocations: usize,
    status_checks: usize,
}

impl State {
    fn allocate_name(&mut self) -> Result<u32, String> {
        self.calls += 1;
        self.allocations += 1;

        if let Some(budget) = self.creation_budget.as_mut() {
            if *budget == 0 {
                return Err("out of memory".to_owned());
            }
            *budget -= 1;
        }

        self.next_name += 1;
        Ok(self.next_name)
    }

    fn object_size(&self, object: MockObject) -> Option<(i32, i32)> {
        match object {
            MockObject::Texture(name) => self
                .textures
                .get(&name)
                .and_then(|t| t.image)
                .map(|i| (i.width, i.height)),
            MockObject::Renderbuffer(name) => self
                .renderbuffers
                .get(&name)
                .and_then(|r| *r)
                .map(|s| (s.width, s.height)),
        }
    }

    fn completeness(&self, framebuffer: u32) -> u32 {
        if let Some(status) = self.forced_status {
            return status;
        }

        let fb = match self.framebuffers.get(&framebuffer) {
            Some(fb) => fb,
            None => return gl::FRAMEBUFFER_UNSUPPORTED,
        };

        if fb.attachments.is_empty() {
            return gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT;
        }

        let mut sizes = HashSet::new();
        for object in fb.attachments.values() {
            match self.object_size(*object) {
                Some((w, h)) if w > 0 && h > 0 => {
                    sizes.insert((w, h));
                }
                _ => return gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
            }
        }

        if sizes.len() > 1 {
            return gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS;
        }

        gl::FRAMEBUFFER_COMPLETE
    }
}

/// Recording [`GlContext`] test double
pub struct MockContext {
    extensions: HashSet<String>,
    limits: HashMap<u32, i32>,
    state: RefCell<State>,
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContext {
    /// Context exposing every optional feature, 4096px renderbuffers and 4 color attachments
    pub fn new() -> Self {
        Self::with_extensions(&[
            "WEBGL_depth_texture",
            "WEBGL_draw_buffers",
            "OES_texture_float",
            "OES_texture_half_float",
        ])
    }

    /// Context exposing only the given extensions
    pub fn with_extensions(extensions: &[&str]) -> Self {
        let mut limits = HashMap::new();
        limits.insert(gl::MAX_RENDERBUFFER_SIZE, 4096);
        limits.insert(gl::MAX_COLOR_ATTACHMENTS, 4);

        Self {
            extensions: extensions.iter().map(|e| (*e).to_owned()).collect(),
            limits,
            state: RefCell::new(State::default()),
        }
    }

    /// Override an integer limit reported by `get_parameter_i32`
    pub fn with_limit(mut self, parameter: u32, value: i32) -> Self {
        self.limits.insert(parameter, value);
        self
    }

    /// Make every completeness query return `status` (or restore modelled behavior with `None`)
    pub fn force_status(&self, status: Option<u32>) {
        self.state.borrow_mut().forced_status = status;
    }

    /// Allow only `count` more object creations before they start failing
    pub fn limit_creations(&self, count: Option<usize>) {
        self.state.borrow_mut().creation_budget = count;
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    pub fn live_renderbuffers(&self) -> usize {
        self.state.borrow().renderbuffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_handles(&self) -> usize {
        self.live_framebuffers() + self.live_renderbuffers() + self.live_textures()
    }

    /// Number of GL calls issued so far
    pub fn call_count(&self) -> usize {
        self.state.borrow().calls
    }

    /// Number of object creations and storage specifications issued so far
    pub fn allocation_count(&self) -> usize {
        self.state.borrow().allocations
    }

    pub fn status_check_count(&self) -> usize {
        self.state.borrow().status_checks
    }

    pub fn bound_framebuffer(&self) -> Option<u32> {
        self.state.borrow().bound_framebuffer
    }

    pub fn bound_renderbuffer(&self) -> Option<u32> {
        self.state.borrow().bound_renderbuffer
    }

    pub fn bound_texture(&self) -> Option<u32> {
        self.state.borrow().bound_texture
    }

    /// Last viewport as `(x, y, width, height)`
    pub fn viewport(&self) -> (i32, i32, i32, i32) {
        self.state.borrow().viewport
    }

    pub fn texture_image(&self, texture: u32) -> Option<TextureImage> {
        self.state.borrow().textures.get(&texture).and_then(|t| t.image)
    }

    pub fn texture_parameter(&self, texture: u32, parameter: u32) -> Option<i32> {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .and_then(|t| t.parameters.get(&parameter).copied())
    }

    pub fn renderbuffer_storage_of(&self, renderbuffer: u32) -> Option<RenderbufferStorage> {
        self.state
            .borrow()
            .renderbuffers
            .get(&renderbuffer)
            .and_then(|r| *r)
    }

    pub fn attachment(&self, framebuffer: u32, point: u32) -> Option<MockObject> {
        self.state
            .borrow()
            .framebuffers
            .get(&framebuffer)
            .and_then(|fb| fb.attachments.get(&point).copied())
    }

    /// Attachment points in use on `framebuffer`, in ascending order
    pub fn attachment_points(&self, framebuffer: u32) -> Vec<u32> {
        self.state
            .borrow()
            .framebuffers
            .get(&framebuffer)
            .map(|fb| fb.attachments.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn draw_buffers_of(&self, framebuffer: u32) -> Option<Vec<u32>> {
        self.state
            .borrow()
            .framebuffers
            .get(&framebuffer)
            .and_then(|fb| fb.draw_buffers.clone())
    }

    /// Completeness the context would report for `framebuffer`, without counting a call
    pub fn completeness_of(&self, framebuffer: u32) -> u32 {
        self.state.borrow().completeness(framebuffer)
    }
}

impl GlContext for MockContext {
    type Framebuffer = u32;
    type Renderbuffer = u32;
    type Texture = u32;

    fn supported_extensions(&self) -> &HashSet<String> {
        self.state.borrow_mut().calls += 1;
        &self.extensions
    }

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32 {
        self.state.borrow_mut().calls += 1;
        self.limits.get(&parameter).copied().unwrap_or(0)
    }

    unsafe fn create_framebuffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate_name()?;
        state.framebuffers.insert(name, FramebufferState::default());
        Ok(name)
    }

    unsafe fn delete_framebuffer(&self, framebuffer: u32) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.framebuffers.remove(&framebuffer);
        if state.bound_framebuffer == Some(framebuffer) {
            state.bound_framebuffer = None;
        }
    }

    unsafe fn bind_framebuffer(&self, _target: u32, framebuffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.bound_framebuffer = framebuffer;
    }

    unsafe fn check_framebuffer_status(&self, _target: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.status_checks += 1;
        match state.bound_framebuffer {
            Some(fb) => state.completeness(fb),
            None => gl::FRAMEBUFFER_COMPLETE,
        }
    }

    unsafe fn framebuffer_texture_2d(
        &self,
        _target: u32,
        attachment: u32,
        _texture_target: u32,
        texture: Option<u32>,
        _level: i32,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if let Some(bound) = state.bound_framebuffer {
            if let Some(fb) = state.framebuffers.get_mut(&bound) {
                match texture {
                    Some(name) => fb.attachments.insert(attachment, MockObject::Texture(name)),
                    None => fb.attachments.remove(&attachment),
                };
            }
        }
    }

    unsafe fn framebuffer_renderbuffer(
        &self,
        _target: u32,
        attachment: u32,
        _renderbuffer_target: u32,
        renderbuffer: Option<u32>,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if let Some(bound) = state.bound_framebuffer {
            if let Some(fb) = state.framebuffers.get_mut(&bound) {
                match renderbuffer {
                    Some(name) => fb.attachments.insert(attachment, MockObject::Renderbuffer(name)),
                    None => fb.attachments.remove(&attachment),
                };
            }
        }
    }

    unsafe fn draw_buffers(&self, buffers: &[u32]) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if let Some(bound) = state.bound_framebuffer {
            if let Some(fb) = state.framebuffers.get_mut(&bound) {
                fb.draw_buffers = Some(buffers.to_vec());
            }
        }
    }

    unsafe fn create_renderbuffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate_name()?;
        state.renderbuffers.insert(name, None);
        Ok(name)
    }

    unsafe fn delete_renderbuffer(&self, renderbuffer: u32) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.renderbuffers.remove(&renderbuffer);
        if state.bound_renderbuffer == Some(renderbuffer) {
            state.bound_renderbuffer = None;
        }
    }

    unsafe fn bind_renderbuffer(&self, _target: u32, renderbuffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.bound_renderbuffer = renderbuffer;
    }

    unsafe fn renderbuffer_storage(
        &self,
        _target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.allocations += 1;
        if let Some(bound) = state.bound_renderbuffer {
            if let Some(storage) = state.renderbuffers.get_mut(&bound) {
                *storage = Some(RenderbufferStorage {
                    internal_format,
                    width,
                    height,
                });
            }
        }
    }

    unsafe fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.allocate_name()?;
        state.textures.insert(name, TextureState::default());
        Ok(name)
    }

    unsafe fn delete_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.textures.remove(&texture);
        if state.bound_texture == Some(texture) {
            state.bound_texture = None;
        }
    }

    unsafe fn bind_texture(&self, _target: u32, texture: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.bound_texture = texture;
    }

    unsafe fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        if let Some(bound) = state.bound_texture {
            if let Some(texture) = state.textures.get_mut(&bound) {
                texture.parameters.insert(parameter, value);
            }
        }
    }

    unsafe fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        _border: i32,
        format: u32,
        ty: u32,
        _pixels: Option<&[u8]>,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.allocations += 1;
        if let Some(bound) = state.bound_texture {
            if let Some(texture) = state.textures.get_mut(&bound) {
                texture.image = Some(TextureImage {
                    internal_format,
                    width,
                    height,
                    format,
                    ty,
                });
            }
        }
    }

    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        state.viewport = (x, y, width, height);
    }
}
