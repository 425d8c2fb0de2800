use crate::protocol::request::describe_topic_partitions::DescribeTopicPartitionsRequest;
use crate::protocol::response::describe_topic_partitions::{
    DescribeTopicPartitionsResponse, Partition, Topic,
};
use crate::protocol::types::Uuid;
use crate::protocol::ErrorCode;

use super::AppState;

/// An empty request names list means "describe everything"; otherwise each
/// requested name is looked up independently so an unknown name among known
/// ones doesn't fail the whole request. Both the topic list and, within each
/// topic, its partition list are returned in ascending order.
pub fn process(
    state: &AppState,
    req: DescribeTopicPartitionsRequest,
) -> DescribeTopicPartitionsResponse {
    let mut names = if req.topics.is_empty() {
        state
            .metadata
            .get_all()
            .map(|t| t.name.clone())
            .collect::<Vec<_>>()
    } else {
        req.topics
    };
    names.sort();

    let topics = names
        .into_iter()
        .map(|name| match state.metadata.get_by_name(&name) {
            Some(topic) => {
                let mut partitions: Vec<Partition> = topic
                    .partitions
                    .iter()
                    .map(|p| Partition {
                        partition_index: p.partition_index,
                        leader_id: p.leader_id,
                        replica_nodes: p.replica_nodes.clone(),
                        isr_nodes: p.isr_nodes.clone(),
                    })
                    .collect();
                partitions.sort_by_key(|p| p.partition_index);

                Topic {
                    error_code: ErrorCode::None,
                    name: topic.name.clone(),
                    topic_id: topic.topic_id,
                    partitions,
                }
            }
            None => Topic {
                error_code: ErrorCode::UnknownTopicOrPartition,
                name,
                topic_id: Uuid::NIL,
                partitions: Vec::new(),
            },
        })
        .collect();

    DescribeTopicPartitionsResponse::new(req.header.correlation_id, topics)
}
