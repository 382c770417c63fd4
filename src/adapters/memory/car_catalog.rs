use crate::domain::value_objects::CarId;
use crate::ports::car_catalog::{CarCatalog as CarCatalogTrait, CarView, Result};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// CarCatalogのインメモリ実装
///
/// 登録順を保持する。テストとローカル実行用。
pub struct CarCatalog {
    cars: Mutex<Vec<CarView>>,
}

impl CarCatalog {
    pub fn new() -> Self {
        Self {
            cars: Mutex::new(Vec::new()),
        }
    }

    /// 車両を登録
    pub fn add_car(&self, car: CarView) {
        self.lock().push(car);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CarView>> {
        self.cars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CarCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CarCatalogTrait for CarCatalog {
    async fn find_available_by_location(&self, location: &str) -> Result<Vec<CarView>> {
        Ok(self
            .lock()
            .iter()
            .filter(|car| car.location == location && car.is_available)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, car_id: CarId) -> Result<Option<CarView>> {
        Ok(self.lock().iter().find(|car| car.car_id == car_id).cloned())
    }

    async fn find_by_ids(&self, car_ids: &[CarId]) -> Result<Vec<CarView>> {
        Ok(self
            .lock()
            .iter()
            .filter(|car| car_ids.contains(&car.car_id))
            .cloned()
            .collect())
    }
}
