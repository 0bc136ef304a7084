/*!
    Base infrastructure for the test framework. Includes basic setup for
    initializing the logger and loading the upgrade configuration.
*/

use tracing::info;

use crate::bootstrap::init::init_test;
use crate::error::Error;
use crate::types::config::Config;

/**
   Runs a primitive test case implementing [`PrimitiveTest`].
*/
pub fn run_test<Test: PrimitiveTest>(test: &Test) -> Result<(), Error> {
    test.run()
}

/**
   Runs a basic test case implementing [`BasicTest`].
*/
pub fn run_basic_test<Test: BasicTest>(test: &Test) -> Result<(), Error> {
    run_test(&RunBasicTest { test })
}

/**
   A primitive test case provides no additional logic.
*/
pub trait PrimitiveTest {
    /// Test runner
    fn run(&self) -> Result<(), Error>;
}

/**
   A basic test is given the [`Config`] loaded by [`init_test`], after the
   test had a chance to modify it.
*/
pub trait BasicTest {
    /// Test runner
    fn run(&self, config: &Config) -> Result<(), Error>;

    /// Override parts of the loaded configuration, e.g. to shorten timeouts.
    fn modify_config(&self, _config: &mut Config) {}
}

/**
   A wrapper type that lifts a test case that implements [`BasicTest`]
   into a test case that implements [`PrimitiveTest`].
*/
pub struct RunBasicTest<'a, Test> {
    /// Inner test
    pub test: &'a Test,
}

impl<'a, Test: BasicTest> PrimitiveTest for RunBasicTest<'a, Test> {
    fn run(&self) -> Result<(), Error> {
        let mut config = init_test()?;
        self.test.modify_config(&mut config);

        info!("starting test with config: {:?}", config);

        self.test.run(&config)
    }
}
