use std::collections::HashMap;

use crate::protocol::types::Uuid;

/// A topic's discovery-time identity and its partitions.
#[derive(Debug, Clone)]
pub struct Topic {
    pub name: String,
    pub topic_id: Uuid,
    pub partitions: Vec<Partition>,
}

/// One partition's routing metadata, as recorded in the KRaft log.
#[derive(Debug, Clone)]
pub struct Partition {
    pub partition_index: i32,
    pub leader_id: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
}

/// The process-wide topic/partition catalog, built once by the metadata
/// loader at startup and treated as immutable afterward. Handlers receive
/// this behind an `Arc` rather than reaching into module-level global state.
#[derive(Debug, Default)]
pub struct MetadataStore {
    topics_by_name: HashMap<String, Topic>,
}

impl MetadataStore {
    pub fn new(topics_by_name: HashMap<String, Topic>) -> Self {
        Self { topics_by_name }
    }

    pub fn get_all(&self) -> impl Iterator<Item = &Topic> {
        self.topics_by_name.values()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Topic> {
        self.topics_by_name.get(name)
    }

    pub fn get_by_id(&self, topic_id: Uuid) -> Option<&Topic> {
        self.topics_by_name
            .values()
            .find(|topic| topic.topic_id == topic_id)
    }

    pub fn exists_by_name(&self, name: &str) -> bool {
        self.topics_by_name.contains_key(name)
    }

    pub fn partition_exists(&self, name: &str, index: i32) -> bool {
        self.get_by_name(name)
            .map(|t| t.partitions.iter().any(|p| p.partition_index == index))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(name: &str, id: u8) -> Topic {
        Topic {
            name: name.to_string(),
            topic_id: Uuid([id; 16]),
            partitions: vec![Partition {
                partition_index: 0,
                leader_id: 7,
                replica_nodes: vec![7],
                isr_nodes: vec![7],
            }],
        }
    }

    #[test]
    fn looks_up_topics_by_name_and_id() {
        let mut map = HashMap::new();
        map.insert("foo".to_string(), topic("foo", 1));
        let store = MetadataStore::new(map);

        assert!(store.exists_by_name("foo"));
        assert!(!store.exists_by_name("bar"));
        assert!(store.partition_exists("foo", 0));
        assert!(!store.partition_exists("foo", 1));
        assert_eq!(store.get_by_id(Uuid([1; 16])).unwrap().name, "foo");
        assert!(store.get_by_id(Uuid([9; 16])).is_none());
    }
}
