//! The pagelet response: an ordered, append-only action log.

use crate::action::{
    Action, Content, Custom, Finalize, Load, Location, Log, Refresh, Resource, Synchronous,
};
use crate::frame::{self, FrameError, SENTINEL};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;

/// Actions to send back for one request, in the order the client applies them.
///
/// Every appended action is finalized first, so the log only ever holds tagged
/// values. Serializes as `{"actions":[...]}`, or `{}` when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    actions: Vec<Action>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize `action` and append it.
    pub fn add_action(&mut self, action: impl Into<Action>) -> &mut Self {
        let action = action.into().finalize();
        tracing::trace!(
            kind = action.kind().unwrap_or_default(),
            position = self.actions.len(),
            "appending pagelet action"
        );
        self.actions.push(action);
        self
    }

    /// Drop every action appended so far.
    pub fn clear_actions(&mut self) -> &mut Self {
        tracing::debug!(discarded = self.actions.len(), "clearing pagelet actions");
        self.actions.clear();
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn add_css_resource(&mut self, url: impl Into<String>) -> &mut Self {
        self.add_action(Resource::css(url))
    }

    pub fn add_js_resource(&mut self, url: impl Into<String>) -> &mut Self {
        self.add_action(Resource::js(url))
    }

    pub fn add_inline_css(&mut self, source: impl Into<String>) -> &mut Self {
        self.add_action(Resource::css(source).inline(true))
    }

    pub fn add_inline_js(&mut self, source: impl Into<String>) -> &mut Self {
        self.add_action(Resource::js(source).inline(true))
    }

    /// Replace the markup of `target` (empty for the requesting region).
    pub fn set_content(
        &mut self,
        content: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut Self {
        self.add_action(Content::new(content, target))
    }

    /// Have the client re-fetch `target` from `url`.
    pub fn add_pagelet_reload(
        &mut self,
        target: impl Into<String>,
        url: impl Into<String>,
    ) -> &mut Self {
        self.add_action(Load::new(target, url))
    }

    pub fn add_refresh(&mut self, target: impl Into<String>) -> &mut Self {
        self.add_action(Refresh::new(target))
    }

    pub fn set_location(&mut self, url: impl Into<String>, replace: bool, reload: bool) -> &mut Self {
        self.add_action(Location::new(url).replace(replace).reload(reload))
    }

    /// Full browser navigation to `url`.
    pub fn redirect(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_location(url, false, true)
    }

    /// Log `message` on the client console. An empty level means "log".
    pub fn set_meta(&mut self, message: impl Into<String>, level: impl Into<String>) -> &mut Self {
        self.add_action(Log::new(message).level(level))
    }

    pub fn add_custom(&mut self, name: impl Into<String>, data: Map<String, Value>) -> &mut Self {
        self.add_action(Custom::new(name).data(data))
    }

    pub fn add_synchronous<I, A>(&mut self, actions: I) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        self.add_action(Synchronous::new(actions))
    }

    /// Markup of the first content action aimed at the requesting region.
    ///
    /// Lets a handler render a full page from the same response when the
    /// request did not come from the pagelets client.
    pub fn primary_content(&self) -> Option<&str> {
        self.actions.iter().find_map(|action| match action {
            Action::Content(content) if content.target.is_empty() => {
                Some(content.content.as_str())
            }
            _ => None,
        })
    }

    /// The JSON body without the sentinel.
    pub fn to_json(&self) -> Result<String, ResponseError> {
        serde_json::to_string(self).map_err(ResponseError::Encode)
    }

    /// The framed wire bytes: sentinel followed by the JSON body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ResponseError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Write the framed wire bytes to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ResponseError> {
        writer.write_all(SENTINEL).map_err(ResponseError::Io)?;
        serde_json::to_writer(&mut writer, self).map_err(ResponseError::Encode)?;
        writer.flush().map_err(ResponseError::Io)?;
        tracing::debug!(actions = self.actions.len(), "serialized pagelet response");
        Ok(())
    }

    /// Parse framed wire bytes. The sentinel is required.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResponseError> {
        let body = frame::unframe(bytes)?;
        serde_json::from_slice(body).map_err(ResponseError::Decode)
    }

    /// Parse an unframed JSON body.
    pub fn from_json(json: &str) -> Result<Self, ResponseError> {
        serde_json::from_str(json).map_err(ResponseError::Decode)
    }
}

impl From<Vec<Action>> for Response {
    fn from(actions: Vec<Action>) -> Self {
        Self {
            actions: actions.iter().map(Finalize::finalize).collect(),
        }
    }
}

/// Error turning a response into bytes or back.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("failed to encode pagelet response: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write pagelet response: {0}")]
    Io(#[source] std::io::Error),
    #[error("failed to decode pagelet response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, ResourceType};
    use serde_json::json;
    use std::io;

    fn decode(response: &Response) -> Value {
        let bytes = response.to_bytes().unwrap();
        let body = frame::unframe(&bytes).unwrap();
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn empty_response_omits_actions() {
        let response = Response::new();
        assert_eq!(response.to_bytes().unwrap(), b")]}'{}");
        assert_eq!(response.to_json().unwrap(), "{}");
    }

    #[test]
    fn end_to_end_order() {
        let mut response = Response::new();
        response.add_css_resource("/my.css");
        response.add_js_resource("/my.js");
        response.set_content("<div>hi</div>", "");

        assert_eq!(
            response.to_json().unwrap(),
            concat!(
                r#"{"actions":["#,
                r#"{"type":"css","data":"/my.css","inline":false,"action":"resource"},"#,
                r#"{"type":"js","data":"/my.js","inline":false,"action":"resource"},"#,
                r#"{"content":"<div>hi</div>","target":"","action":"content"}"#,
                r#"]}"#,
            )
        );

        let Action::Resource(css) = &response.actions()[0] else {
            panic!("expected resource");
        };
        assert_eq!(css.resource_type, ResourceType::Css);
        assert!(!css.inline);
    }

    #[test]
    fn appends_keep_call_order_and_kinds() {
        let mut response = Response::new();
        response
            .add_pagelet_reload("#a", "/a")
            .add_pagelet_reload("#b", "/b")
            .add_refresh("#a")
            .set_meta("done", "info")
            .set_location("/next", true, false)
            .add_inline_css("body{}")
            .add_synchronous([Refresh::new("#c")])
            .add_custom("my-items", Map::new());

        let kinds: Vec<_> = decode(&response)["actions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["action"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            kinds,
            [
                "load",
                "load",
                "refresh",
                "log",
                "location",
                "resource",
                "synchronous",
                "my-items"
            ]
        );
        assert_eq!(response.len(), 8);
    }

    #[test]
    fn repeated_actions_are_not_deduplicated() {
        let mut response = Response::new();
        response.add_refresh("#a").add_refresh("#a");
        assert_eq!(response.actions()[0], response.actions()[1]);
        assert_eq!(response.len(), 2);
    }

    #[test]
    fn clear_matches_fresh_response() {
        let mut response = Response::new();
        response.set_content("x", "main").redirect("/");
        response.clear_actions();

        assert!(response.is_empty());
        assert_eq!(response.to_bytes().unwrap(), Response::new().to_bytes().unwrap());

        response.add_pagelet_reload("#my-page", "/new-url");
        assert_eq!(
            response.to_json().unwrap(),
            r##"{"actions":[{"target":"#my-page","url":"/new-url","action":"load"}]}"##
        );
    }

    #[test]
    fn redirect_is_full_navigation() {
        let mut redirected = Response::new();
        redirected.redirect("/reload-page");
        let mut located = Response::new();
        located.set_location("/reload-page", false, true);

        assert_eq!(redirected.to_bytes().unwrap(), located.to_bytes().unwrap());
        assert_eq!(
            decode(&redirected)["actions"][0],
            json!({ "url": "/reload-page", "replace": false, "reload": true, "action": "location" })
        );
    }

    #[test]
    fn set_meta_normalizes_empty_level() {
        let mut response = Response::new();
        response.set_meta("hello", "").set_meta("careful", "warn");

        let body = decode(&response);
        assert_eq!(body["actions"][0]["level"], "log");
        assert_eq!(body["actions"][1]["level"], "warn");
    }

    #[test]
    fn appended_actions_are_finalized() {
        let mut response = Response::new();
        let css = Resource::css("/x.css");
        response.add_action(css.clone());

        assert_eq!(css.kind(), None);
        assert_eq!(response.actions()[0].kind(), Some(ActionKind::Resource.as_str()));
    }

    #[test]
    fn from_vec_finalizes() {
        let response = Response::from(vec![Action::from(Refresh::new("a"))]);
        assert!(response.actions().iter().all(Action::is_finalized));
    }

    #[test]
    fn primary_content_skips_targeted_content() {
        let mut response = Response::new();
        assert_eq!(response.primary_content(), None);

        response
            .set_content("sidebar", "side")
            .set_content("main body", "")
            .set_content("later", "");
        assert_eq!(response.primary_content(), Some("main body"));
    }

    #[test]
    fn bytes_roundtrip() {
        let mut response = Response::new();
        response
            .add_js_resource("/app.js")
            .set_content("<b>x</b>", "main")
            .add_synchronous([Action::from(Load::new("#a", "/a")), Log::new("hi").into()])
            .add_custom(
                "my-items",
                json!({ "items": ["one", "two"] }).as_object().unwrap().clone(),
            );

        let decoded = Response::from_bytes(&response.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn from_bytes_requires_sentinel() {
        let err = Response::from_bytes(b"{}").unwrap_err();
        assert!(matches!(err, ResponseError::Frame(FrameError::MissingSentinel)));

        assert!(Response::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn from_bytes_rejects_invalid_json() {
        let err = Response::from_bytes(b")]}'{\"actions\":[").unwrap_err();
        assert!(matches!(err, ResponseError::Decode(_)));
    }

    struct FailingWriter {
        remaining: usize,
    }

    impl io::Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_reported() {
        let mut response = Response::new();
        response.set_content("body", "");

        let err = response.write_to(FailingWriter { remaining: 0 }).unwrap_err();
        assert!(matches!(err, ResponseError::Io(_)));

        let err = response
            .write_to(FailingWriter {
                remaining: SENTINEL.len() + 4,
            })
            .unwrap_err();
        assert!(matches!(err, ResponseError::Encode(_)));
    }
}
