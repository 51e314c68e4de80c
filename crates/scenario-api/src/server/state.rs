#[derive(Clone)]
pub struct AppState {
    service: Arc<ScenarioService>,
    baselines: Arc<dyn BaselineSource>,
    bounds: ScenarioBounds,
}

impl AppState {
    pub fn new(
        service: ScenarioService,
        baselines: impl BaselineSource + 'static,
        bounds: ScenarioBounds,
    ) -> Self {
        Self {
            service: Arc::new(service),
            baselines: Arc::new(baselines),
            bounds,
        }
    }

    pub fn service(&self) -> &ScenarioService {
        &self.service
    }
}
