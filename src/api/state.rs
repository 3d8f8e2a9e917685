use crate::db::warehouse::Warehouse;
use crate::etl::pipeline::Pipeline;
use std::sync::Arc;

pub struct AppState {
    pub warehouse: Arc<Warehouse>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(warehouse: Arc<Warehouse>) -> Self {
        let pipeline = Arc::new(Pipeline::new(Arc::clone(&warehouse)));
        Self {
            warehouse,
            pipeline,
        }
    }
}
