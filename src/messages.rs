//! Message operations: list, get, create, comment, edit, delete and stream.

use tracing::info;

use crate::client::Client;
use crate::endpoint::{self, redact_access_token};
use crate::error::{ErrorContext, FlowdockResult, ResultExt};
use crate::models::{CreateOptions, EditOptions, ListOptions, Message, ToParams};
use crate::stream::MessageStream;
use crate::traits::Method;

/// Message endpoints of a [`Client`].
#[derive(Debug, Clone, Copy)]
pub struct MessagesService<'a> {
    client: &'a Client,
}

impl<'a> MessagesService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List a flow's messages, in the order the server returns them.
    pub async fn list(
        &self,
        org: &str,
        flow: &str,
        options: &ListOptions,
    ) -> FlowdockResult<Vec<Message>> {
        let ctx = || context("list", org, flow);
        let path = endpoint::messages_path(org, flow).with_context(ctx)?;
        let request = self
            .client
            .request(Method::Get, &path)
            .with_context(ctx)?
            .query(options.to_params());

        self.client
            .execute_json(request, &path)
            .await
            .with_context(ctx)
    }

    /// Fetch one message.
    pub async fn get(&self, org: &str, flow: &str, id: i64) -> FlowdockResult<Message> {
        let ctx = || context("get", org, flow).with_message_id(id);
        let path = endpoint::message_path(org, flow, id).with_context(ctx)?;
        let request = self.client.request(Method::Get, &path).with_context(ctx)?;

        self.client
            .execute_json(request, &path)
            .await
            .with_context(ctx)
    }

    /// Post a message. `options.flow` selects the flow by id.
    pub async fn create(&self, options: &CreateOptions) -> FlowdockResult<Message> {
        self.post("messages", "create", options).await
    }

    /// Post a comment on the message `options.message`.
    pub async fn create_comment(&self, options: &CreateOptions) -> FlowdockResult<Message> {
        self.post("comments", "create_comment", options).await
    }

    /// Change a message's content or tags.
    pub async fn edit(
        &self,
        org: &str,
        flow: &str,
        id: i64,
        options: &EditOptions,
    ) -> FlowdockResult<()> {
        let ctx = || context("edit", org, flow).with_message_id(id);
        let path = endpoint::message_path(org, flow, id).with_context(ctx)?;
        let request = self
            .client
            .request(Method::Put, &path)
            .with_context(ctx)?
            .query(options.to_params());

        self.client.execute_ack(request, &path).await.with_context(ctx)
    }

    pub async fn delete(&self, org: &str, flow: &str, id: i64) -> FlowdockResult<()> {
        let ctx = || context("delete", org, flow).with_message_id(id);
        let path = endpoint::message_path(org, flow, id).with_context(ctx)?;
        let request = self.client.request(Method::Delete, &path).with_context(ctx)?;

        self.client.execute_ack(request, &path).await.with_context(ctx)
    }

    /// Subscribe to a flow's live messages.
    ///
    /// The URL is validated and the subscription task started right away;
    /// connecting happens on that task. Must be called from within a Tokio
    /// runtime.
    pub fn stream(&self, token: &str, org: &str, flow: &str) -> FlowdockResult<MessageStream> {
        let ctx = || context("stream", org, flow).with_component("stream");
        let url = endpoint::stream_url(self.client.stream_url(), token, org, flow)
            .with_context(ctx)?;

        info!(url = %redact_access_token(url.as_str()), "Subscribing to flow");
        let frames = self
            .client
            .event_source()
            .open(url.as_str())
            .with_context(ctx)?;

        Ok(MessageStream::spawn(
            frames,
            self.client.config().frame_policy,
            format!("{}/{}", org, flow),
        ))
    }

    async fn post(
        &self,
        path: &str,
        operation: &'static str,
        options: &CreateOptions,
    ) -> FlowdockResult<Message> {
        let ctx = || {
            let ctx = ErrorContext::new(operation).with_component("messages");
            if options.message != 0 {
                ctx.with_message_id(options.message)
            } else {
                ctx
            }
        };
        let request = self
            .client
            .request(Method::Post, path)
            .with_context(ctx)?
            .form(options.to_params());

        self.client
            .execute_json(request, path)
            .await
            .with_context(ctx)
    }
}

fn context(operation: &str, org: &str, flow: &str) -> ErrorContext {
    ErrorContext::new(operation)
        .with_flow(org, flow)
        .with_component("messages")
}
