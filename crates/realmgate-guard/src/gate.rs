//! Permission-gated UI elements.
//!
//! A [`GateBinding`] says which admin permission code an element needs and
//! what happens when it's missing: the element is hidden (default) or
//! disabled. [`CapabilityGate::update`] is re-run on every mount and render;
//! it only reads the permission evaluator and owns no state of its own.
//! What it changes lives on the element's [`ElementState`].

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::PermissionCheck;

/// Class added to elements disabled by the gate.
pub const PERM_DISABLED_CLASS: &str = "perm-disabled";

// ---------------------------------------------------------------------------
// GateBinding
// ---------------------------------------------------------------------------

/// What to do with an element whose code isn't granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    #[default]
    Hide,
    Disable,
}

/// One element's permission binding.
///
/// Deserializes from a bare code string, a `{ "code", "mode" }` object, or
/// `null` (no code, always allowed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<RawBinding>")]
pub struct GateBinding {
    pub code: String,
    pub mode: GateMode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBinding {
    Code(String),
    Structured {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        mode: Option<GateMode>,
    },
}

impl From<Option<RawBinding>> for GateBinding {
    fn from(raw: Option<RawBinding>) -> Self {
        match raw {
            Some(RawBinding::Code(code)) => Self::hide(code),
            Some(RawBinding::Structured { code, mode }) => Self {
                code: code.unwrap_or_default(),
                mode: mode.unwrap_or_default(),
            },
            None => Self::none(),
        }
    }
}

impl GateBinding {
    /// Hide the element unless `code` is granted.
    pub fn hide(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            mode: GateMode::Hide,
        }
    }

    /// Disable the element unless `code` is granted.
    pub fn disable(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            mode: GateMode::Disable,
        }
    }

    /// No requirement.
    pub fn none() -> Self {
        Self::default()
    }
}

impl From<&str> for GateBinding {
    fn from(code: &str) -> Self {
        Self::hide(code)
    }
}

// ---------------------------------------------------------------------------
// ElementState
// ---------------------------------------------------------------------------

/// The parts of an element the gate touches.
///
/// `display` is the inline display style; an empty string means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub display: String,
    /// Display value saved when the gate hid the element.
    prev_display: Option<String>,
    pub disabled: bool,
    pub aria_disabled: bool,
    pub classes: BTreeSet<String>,
}

impl ElementState {
    /// An element with no inline display style.
    pub fn new() -> Self {
        Self::default()
    }

    /// An element with an inline display style already set.
    pub fn with_display(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if the gate has hidden this element.
    pub fn is_hidden(&self) -> bool {
        self.prev_display.is_some()
    }

    /// Returns `true` if the element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn allow(&mut self) {
        if let Some(prev) = self.prev_display.take() {
            self.display = prev;
        }
        self.classes.remove(PERM_DISABLED_CLASS);
        self.disabled = false;
        self.aria_disabled = false;
    }

    fn deny_disable(&mut self) {
        self.classes.insert(PERM_DISABLED_CLASS.to_string());
        self.disabled = true;
        self.aria_disabled = true;
    }

    fn deny_hide(&mut self) {
        // Only the first hide remembers; a second would save "none".
        if self.prev_display.is_none() {
            self.prev_display = Some(std::mem::take(&mut self.display));
        }
        self.display = "none".to_string();
    }
}

/// How an element should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Visible,
    Hidden,
    Disabled,
}

// ---------------------------------------------------------------------------
// CapabilityGate
// ---------------------------------------------------------------------------

/// Applies bindings against the live admin permission state.
#[derive(Clone)]
pub struct CapabilityGate {
    checker: Arc<dyn PermissionCheck + Send + Sync>,
}

impl CapabilityGate {
    /// A gate reading permissions from `checker`.
    pub fn new(checker: Arc<dyn PermissionCheck + Send + Sync>) -> Self {
        Self { checker }
    }

    /// Returns `true` if `binding`'s code is granted.
    pub fn allows(&self, binding: &GateBinding) -> bool {
        self.checker.has_permission(&binding.code)
    }

    /// What `binding` resolves to right now.
    pub fn affordance(&self, binding: &GateBinding) -> Affordance {
        match (self.allows(binding), binding.mode) {
            (true, _) => Affordance::Visible,
            (false, GateMode::Hide) => Affordance::Hidden,
            (false, GateMode::Disable) => Affordance::Disabled,
        }
    }

    /// Applies `binding` to a freshly mounted element.
    pub fn mount(&self, element: &mut ElementState, binding: &GateBinding) -> Affordance {
        self.update(element, binding)
    }

    /// Re-applies `binding` after a render.
    ///
    /// Allowing clears both effects, whichever mode set them.
    pub fn update(&self, element: &mut ElementState, binding: &GateBinding) -> Affordance {
        let affordance = self.affordance(binding);
        match affordance {
            Affordance::Visible => element.allow(),
            Affordance::Disabled => element.deny_disable(),
            Affordance::Hidden => element.deny_hide(),
        }
        affordance
    }
}

impl std::fmt::Debug for CapabilityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityGate").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Gated
// ---------------------------------------------------------------------------

/// Content wrapped in a permission binding.
#[derive(Debug, Clone)]
pub struct Gated<T> {
    binding: GateBinding,
    element: ElementState,
    content: T,
}

impl<T> Gated<T> {
    /// Wraps `content` behind `binding`.
    pub fn new(binding: impl Into<GateBinding>, content: T) -> Self {
        Self {
            binding: binding.into(),
            element: ElementState::new(),
            content,
        }
    }

    /// Re-evaluates the binding. Call on mount and on every session change.
    pub fn sync(&mut self, gate: &CapabilityGate) -> Affordance {
        gate.update(&mut self.element, &self.binding)
    }

    /// The content, unless hidden.
    pub fn render(&self) -> Option<&T> {
        (!self.element.is_hidden()).then_some(&self.content)
    }

    /// The wrapped element's state.
    pub fn element(&self) -> &ElementState {
        &self.element
    }

    pub fn binding(&self) -> &GateBinding {
        &self.binding
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// Grants `user:create` only while `granted` is set.
    #[derive(Default)]
    struct Switch {
        granted: AtomicBool,
    }

    impl PermissionCheck for Switch {
        fn has_permission(&self, code: &str) -> bool {
            code.is_empty() || (code == "user:create" && self.granted.load(Ordering::SeqCst))
        }
    }

    fn gate() -> (Arc<Switch>, CapabilityGate) {
        let switch = Arc::new(Switch::default());
        (switch.clone(), CapabilityGate::new(switch))
    }

    #[test]
    fn test_binding_deserializes_every_form() {
        let bare: GateBinding = serde_json::from_str(r#""user:create""#).expect("should decode");
        assert_eq!(bare, GateBinding::hide("user:create"));

        let structured: GateBinding =
            serde_json::from_str(r#"{ "code": "user:create", "mode": "disable" }"#).expect("should decode");
        assert_eq!(structured, GateBinding::disable("user:create"));

        let defaulted: GateBinding = serde_json::from_str(r#"{ "code": "role:edit" }"#).expect("should decode");
        assert_eq!(defaulted.mode, GateMode::Hide);

        let missing: GateBinding = serde_json::from_str("null").expect("should decode");
        assert_eq!(missing, GateBinding::none());
    }

    #[test]
    fn test_update_empty_code_is_always_visible() {
        let (_, gate) = gate();
        let mut el = ElementState::new();
        assert_eq!(gate.mount(&mut el, &GateBinding::none()), Affordance::Visible);
        assert_eq!(el, ElementState::new());
    }

    #[test]
    fn test_update_hide_restores_prior_display() {
        let (switch, gate) = gate();
        let binding = GateBinding::hide("user:create");
        let mut el = ElementState::with_display("inline-flex");

        assert_eq!(gate.mount(&mut el, &binding), Affordance::Hidden);
        assert_eq!(el.display, "none");

        // Repeated denials must not overwrite the saved value with "none".
        gate.update(&mut el, &binding);
        switch.granted.store(true, Ordering::SeqCst);
        assert_eq!(gate.update(&mut el, &binding), Affordance::Visible);
        assert_eq!(el.display, "inline-flex");
        assert!(!el.is_hidden());
    }

    #[test]
    fn test_update_hide_toggles_repeatedly_without_drift() {
        let (switch, gate) = gate();
        let binding = GateBinding::hide("user:create");
        let mut el = ElementState::new();

        for _ in 0..3 {
            switch.granted.store(false, Ordering::SeqCst);
            gate.update(&mut el, &binding);
            switch.granted.store(true, Ordering::SeqCst);
            gate.update(&mut el, &binding);
        }

        assert_eq!(el, ElementState::new());
    }

    #[test]
    fn test_update_disable_keeps_visibility() {
        let (_, gate) = gate();
        let mut el = ElementState::with_display("block");

        assert_eq!(gate.mount(&mut el, &GateBinding::disable("user:create")), Affordance::Disabled);

        assert_eq!(el.display, "block");
        assert!(el.disabled);
        assert!(el.aria_disabled);
        assert!(el.has_class(PERM_DISABLED_CLASS));
    }

    #[test]
    fn test_update_allow_clears_effects_from_both_modes() {
        let (switch, gate) = gate();
        let mut el = ElementState::new();
        gate.mount(&mut el, &GateBinding::disable("user:create"));
        gate.update(&mut el, &GateBinding::hide("user:create"));

        switch.granted.store(true, Ordering::SeqCst);
        gate.update(&mut el, &GateBinding::hide("user:create"));

        assert!(!el.disabled);
        assert!(!el.aria_disabled);
        assert!(!el.has_class(PERM_DISABLED_CLASS));
        assert!(!el.is_hidden());
    }

    #[test]
    fn test_gated_render_follows_sync() {
        let (switch, gate) = gate();
        let mut button = Gated::new("user:create", "New user");

        button.sync(&gate);
        assert_eq!(button.render(), None);

        switch.granted.store(true, Ordering::SeqCst);
        button.sync(&gate);
        assert_eq!(button.render(), Some(&"New user"));
    }
}
