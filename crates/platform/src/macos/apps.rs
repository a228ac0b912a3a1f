#![forbid(unsafe_code)]

use super::MacDesktop;
use crate::applescript::{self, Launch};
use layout::ControlError;
use layout::control::{AppBackend, GeometryMutator, LaunchStrategy};
use layout::domain::{Rect, RunningApp};

impl AppBackend for MacDesktop {
    fn running_apps(&self) -> Result<Vec<RunningApp>, ControlError> {
        let output = applescript::run(applescript::PROCESS_TABLE)?;
        Ok(applescript::parse_process_table(&output))
    }

    fn process_exists(&self, pid: u32) -> bool {
        self.processes.is_alive(pid)
    }

    fn activate(&self, pid: u32) -> Result<(), ControlError> {
        applescript::run(&applescript::activate(pid)).map(drop)
    }

    fn set_hidden(&self, pid: u32, hidden: bool) -> Result<(), ControlError> {
        applescript::run(&applescript::set_visible(pid, !hidden)).map(drop)
    }

    fn launch(&self, strategy: &LaunchStrategy) -> Result<(), ControlError> {
        match applescript::launch(strategy) {
            Launch::Script(source) => applescript::run(&source).map(drop),
            Launch::Open(args) => applescript::open(&args),
        }
    }
}

impl GeometryMutator for MacDesktop {
    fn move_resize(&self, pid: u32, bounds: Rect, title: Option<&str>) -> Result<(), ControlError> {
        if !self.processes.is_alive(pid) {
            return Err(ControlError::ProcessNotFound(pid));
        }
        applescript::run(&applescript::move_resize(pid, bounds, title)).map(drop)
    }

    fn unminimize(&self, pid: u32, title: Option<&str>) -> Result<(), ControlError> {
        if !self.processes.is_alive(pid) {
            return Err(ControlError::ProcessNotFound(pid));
        }
        applescript::run(&applescript::unminimize(pid, title)).map(drop)
    }
}
