mod snapshot;

pub use snapshot::{
    CapturedNode, Content, DocumentBuilder, ElementBuilder, ElementData, Mutation, NodeId, PageCapture,
    SnapshotDocument,
};
