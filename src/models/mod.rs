mod content;
mod message;
mod options;

pub use content::{
    CommentContent, Content, MessageContent, VcsCommit, VcsContent, VcsPayload, VcsPerson,
    VcsRepository,
};
pub use message::Message;
pub use options::{
    CreateOptions, EditOptions, InboxCreateOptions, ListOptions, Params, TagMode, ToParams,
};
