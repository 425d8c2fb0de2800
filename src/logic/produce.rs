use crate::error::Result;
use crate::protocol::request::produce::ProduceRequest;
use crate::protocol::response::produce::{PartitionResponse, ProduceResponse, TopicResponse};
use crate::protocol::ErrorCode;

use super::AppState;

pub async fn process(state: &AppState, req: ProduceRequest) -> Result<ProduceResponse> {
    let mut topic_responses = Vec::with_capacity(req.topic_data.len());

    for topic_data in req.topic_data {
        let known_topic = state.metadata.get_by_name(&topic_data.name);

        let mut partition_responses = Vec::with_capacity(topic_data.partition_data.len());
        for partition_data in topic_data.partition_data {
            let response = match known_topic {
                None => PartitionResponse {
                    index: partition_data.index,
                    error_code: ErrorCode::UnknownTopicOrPartition,
                    base_offset: -1,
                    log_start_offset: -1,
                },
                Some(topic) if !topic.partitions.iter().any(|p| p.partition_index == partition_data.index) => {
                    PartitionResponse {
                        index: partition_data.index,
                        error_code: ErrorCode::UnknownTopicOrPartition,
                        base_offset: -1,
                        log_start_offset: -1,
                    }
                }
                Some(topic) => {
                    let base_offset = match &partition_data.records {
                        Some(records) => {
                            let path = state
                                .config
                                .partition_log_path(&topic.name, partition_data.index);
                            state
                                .logs
                                .append(&topic.name, partition_data.index, &path, records)
                                .await?
                        }
                        None => 0,
                    };
                    PartitionResponse {
                        index: partition_data.index,
                        error_code: ErrorCode::None,
                        base_offset,
                        log_start_offset: 0,
                    }
                }
            };
            partition_responses.push(response);
        }

        topic_responses.push(TopicResponse {
            name: topic_data.name,
            partition_responses,
        });
    }

    Ok(ProduceResponse::new(req.header.correlation_id, topic_responses))
}
