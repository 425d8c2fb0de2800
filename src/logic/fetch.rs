use bytes::Bytes;

use crate::error::Result;
use crate::protocol::request::fetch::FetchRequest;
use crate::protocol::response::fetch::{FetchResponse, PartitionResponse, TopicResponse};
use crate::protocol::ErrorCode;

use super::AppState;

pub async fn process(state: &AppState, req: FetchRequest) -> Result<FetchResponse> {
    let mut responses = Vec::with_capacity(req.topics.len());

    for topic in req.topics {
        let known_topic = state.metadata.get_by_id(topic.topic_id);

        let mut partitions = Vec::with_capacity(topic.partitions.len());
        for partition in topic.partitions {
            let known_partition = known_topic.is_some_and(|t| {
                t.partitions
                    .iter()
                    .any(|p| p.partition_index == partition.partition)
            });

            let response = if !known_partition {
                PartitionResponse {
                    partition_index: partition.partition,
                    error_code: ErrorCode::UnknownTopicId,
                    high_watermark: partition.fetch_offset,
                    last_stable_offset: partition.fetch_offset,
                    log_start_offset: partition.log_start_offset,
                    preferred_read_replica: -1,
                    records: None,
                }
            } else {
                let meta_topic = known_topic.expect("checked by known_partition above");
                let path = state
                    .config
                    .partition_log_path(&meta_topic.name, partition.partition);
                let records: Bytes = state.logs.read_all(&path).await?;
                PartitionResponse {
                    partition_index: partition.partition,
                    error_code: ErrorCode::None,
                    high_watermark: partition.fetch_offset,
                    last_stable_offset: partition.fetch_offset,
                    log_start_offset: partition.log_start_offset,
                    preferred_read_replica: -1,
                    records: Some(records),
                }
            };
            partitions.push(response);
        }

        responses.push(TopicResponse {
            topic_id: topic.topic_id,
            partitions,
        });
    }

    Ok(FetchResponse::new(req.header.correlation_id, responses))
}
