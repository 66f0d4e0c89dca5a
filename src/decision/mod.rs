pub mod filter;
pub mod pipeline;
pub mod query;

pub use pipeline::DecisionPipeline;
pub use query::{
    FullProposalListQuery, FullProposalSortKey, Paginated, ProposalListQuery, ProposalSortKey,
    SortOrder,
};
