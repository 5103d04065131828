use procsim_core::sim::{TickObserver, TickRecord};

mockall::mock! {
    pub Observer {}

    impl TickObserver for Observer {
        fn on_tick(&mut self, record: &TickRecord);
    }
}
