/// Whoever else draws on the display plane while the overlay is disabled.
pub trait DisplayService {
    fn relinquish(&mut self);
    fn resume(&mut self);
}

