//! Team inbox push API.

use crate::client::Client;
use crate::endpoint;
use crate::error::{ErrorContext, FlowdockResult, ResultExt};
use crate::models::{InboxCreateOptions, Message, ToParams};
use crate::traits::Method;

// the flow API token is part of the path, so it never reaches the logs
const INBOX_ROUTE: &str = "v1/messages/team_inbox/***";

/// Team inbox endpoints of a [`Client`].
#[derive(Debug, Clone, Copy)]
pub struct InboxService<'a> {
    client: &'a Client,
}

impl<'a> InboxService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Post an item to the team inbox of the flow owning `flow_api_token`.
    pub async fn create(
        &self,
        flow_api_token: &str,
        options: &InboxCreateOptions,
    ) -> FlowdockResult<Message> {
        let ctx = || ErrorContext::new("inbox_create").with_component("inbox");
        let path = endpoint::inbox_path(flow_api_token).with_context(ctx)?;
        let request = self
            .client
            .request(Method::Post, &path)
            .with_context(ctx)?
            .form(options.to_params());

        self.client
            .execute_json(request, INBOX_ROUTE)
            .await
            .with_context(ctx)
    }
}
