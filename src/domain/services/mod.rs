mod candidates;
mod reply_check;

pub use candidates::CandidateSet;
pub use reply_check::ReplyCheck;
