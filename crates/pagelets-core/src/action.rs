//! Pagelet actions.
//!
//! Each variant is a plain value built by the caller. The discriminant sent
//! under the `action` key is private to this crate and is only stamped by
//! [`Finalize::finalize`], so a value can never carry the wrong tag.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Level used by [`Log`] when none is given.
pub const DEFAULT_LOG_LEVEL: &str = "log";

/// Discriminant of a built-in action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Content,
    Load,
    Location,
    Log,
    Refresh,
    Resource,
    Synchronous,
}

impl ActionKind {
    /// The wire name (e.g., "content", "load").
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Content => "content",
            ActionKind::Load => "load",
            ActionKind::Location => "location",
            ActionKind::Log => "log",
            ActionKind::Refresh => "refresh",
            ActionKind::Resource => "resource",
            ActionKind::Synchronous => "synchronous",
        }
    }

    /// Look up a built-in kind by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "content" => Some(ActionKind::Content),
            "load" => Some(ActionKind::Load),
            "location" => Some(ActionKind::Location),
            "log" => Some(ActionKind::Log),
            "refresh" => Some(ActionKind::Refresh),
            "resource" => Some(ActionKind::Resource),
            "synchronous" => Some(ActionKind::Synchronous),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stamp an action with its discriminant.
///
/// Finalizing is pure: it returns a tagged copy and leaves `self` untouched.
/// Finalizing an already finalized value returns an equal value.
pub trait Finalize {
    fn finalize(&self) -> Self;
}

/// Replace the markup of a region. An empty target addresses the region the
/// request was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub content: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Content {
    pub fn new(content: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            target: target.into(),
            action: None,
        }
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Content {
    fn finalize(&self) -> Self {
        Self {
            action: Some(ActionKind::Content),
            ..self.clone()
        }
    }
}

/// Re-fetch a region from `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Load {
    pub target: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Load {
    pub fn new(target: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            url: url.into(),
            action: None,
        }
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Load {
    fn finalize(&self) -> Self {
        Self {
            action: Some(ActionKind::Load),
            ..self.clone()
        }
    }
}

/// Navigate the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub url: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
    /// Do a full browser navigation instead of routing in-page.
    pub reload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Location {
    /// Push navigation to `url`, routed in-page.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            replace: false,
            reload: false,
            action: None,
        }
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Location {
    fn finalize(&self) -> Self {
        Self {
            action: Some(ActionKind::Location),
            ..self.clone()
        }
    }
}

/// A message written to the client console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub message: String,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: DEFAULT_LOG_LEVEL.to_string(),
            action: None,
        }
    }

    /// Set the console level ("warn", "error", ...). Empty means
    /// [`DEFAULT_LOG_LEVEL`].
    pub fn level(mut self, level: impl Into<String>) -> Self {
        let level = level.into();
        self.level = if level.is_empty() {
            DEFAULT_LOG_LEVEL.to_string()
        } else {
            level
        };
        self
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Log {
    fn finalize(&self) -> Self {
        Self {
            action: Some(ActionKind::Log),
            ..self.clone()
        }
    }
}

/// Re-render a region in place without fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refresh {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Refresh {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            action: None,
        }
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Refresh {
    fn finalize(&self) -> Self {
        Self {
            action: Some(ActionKind::Refresh),
            ..self.clone()
        }
    }
}

/// Type of an attached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Css,
    Js,
}

/// Attach a stylesheet or script, by URL or inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// URL, or the source itself when `inline` is set.
    pub data: String,
    pub inline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Resource {
    pub fn new(resource_type: ResourceType, data: impl Into<String>) -> Self {
        Self {
            resource_type,
            data: data.into(),
            inline: false,
            action: None,
        }
    }

    pub fn css(data: impl Into<String>) -> Self {
        Self::new(ResourceType::Css, data)
    }

    pub fn js(data: impl Into<String>) -> Self {
        Self::new(ResourceType::Js, data)
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Resource {
    fn finalize(&self) -> Self {
        Self {
            action: Some(ActionKind::Resource),
            ..self.clone()
        }
    }
}

/// Nested actions the client applies one after another, waiting for each to
/// complete before starting the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synchronous {
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionKind>,
}

impl Synchronous {
    pub fn new<I, A>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            action: None,
        }
    }

    pub fn push(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.action
    }
}

impl Finalize for Synchronous {
    fn finalize(&self) -> Self {
        Self {
            actions: self.actions.iter().map(Finalize::finalize).collect(),
            action: Some(ActionKind::Synchronous),
        }
    }
}

/// Application-defined action, handled by a processor registered on the
/// client under `name`.
///
/// Payload keys are flattened into the action object. An `action` key in the
/// payload is dropped on finalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Custom {
    #[serde(skip)]
    name: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<String>,
}

impl Custom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Map::new(),
            action: None,
        }
    }

    /// Add one payload entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Replace the whole payload.
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

impl Finalize for Custom {
    fn finalize(&self) -> Self {
        let mut data = self.data.clone();
        data.remove("action");
        Self {
            name: self.name.clone(),
            data,
            action: Some(self.name.clone()),
        }
    }
}

/// One instruction in a pagelet response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Action {
    Content(Content),
    Load(Load),
    Location(Location),
    Log(Log),
    Refresh(Refresh),
    Resource(Resource),
    Synchronous(Synchronous),
    Custom(Custom),
}

impl Action {
    /// The wire discriminant, or `None` if the action was never finalized.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Action::Content(a) => a.kind().map(ActionKind::as_str),
            Action::Load(a) => a.kind().map(ActionKind::as_str),
            Action::Location(a) => a.kind().map(ActionKind::as_str),
            Action::Log(a) => a.kind().map(ActionKind::as_str),
            Action::Refresh(a) => a.kind().map(ActionKind::as_str),
            Action::Resource(a) => a.kind().map(ActionKind::as_str),
            Action::Synchronous(a) => a.kind().map(ActionKind::as_str),
            Action::Custom(a) => a.kind(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.kind().is_some()
    }
}

impl Finalize for Action {
    fn finalize(&self) -> Self {
        match self {
            Action::Content(a) => Action::Content(a.finalize()),
            Action::Load(a) => Action::Load(a.finalize()),
            Action::Location(a) => Action::Location(a.finalize()),
            Action::Log(a) => Action::Log(a.finalize()),
            Action::Refresh(a) => Action::Refresh(a.finalize()),
            Action::Resource(a) => Action::Resource(a.finalize()),
            Action::Synchronous(a) => Action::Synchronous(a.finalize()),
            Action::Custom(a) => Action::Custom(a.finalize()),
        }
    }
}

// Dispatch on the `action` key. Unknown names decode as `Custom`.
impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let name = match fields.get("action") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(de::Error::custom("`action` must be a string")),
            None => return Err(de::Error::missing_field("action")),
        };

        let Some(kind) = ActionKind::from_name(&name) else {
            fields.remove("action");
            return Ok(Action::Custom(Custom {
                name: name.clone(),
                data: fields,
                action: Some(name),
            }));
        };

        let value = Value::Object(fields);
        let action = match kind {
            ActionKind::Content => serde_json::from_value(value).map(Action::Content),
            ActionKind::Load => serde_json::from_value(value).map(Action::Load),
            ActionKind::Location => serde_json::from_value(value).map(Action::Location),
            ActionKind::Log => serde_json::from_value(value).map(Action::Log),
            ActionKind::Refresh => serde_json::from_value(value).map(Action::Refresh),
            ActionKind::Resource => serde_json::from_value(value).map(Action::Resource),
            ActionKind::Synchronous => serde_json::from_value(value).map(Action::Synchronous),
        };
        action.map_err(de::Error::custom)
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Action {
                fn from(action: $variant) -> Self {
                    Action::$variant(action)
                }
            }
        )*
    };
}

impl_from_variant!(Content, Load, Location, Log, Refresh, Resource, Synchronous, Custom);
