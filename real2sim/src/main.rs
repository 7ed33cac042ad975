mod args;
use anyhow::Result;
use args::Args;
use clap::Parser;
use log::info;
use real2sim_core::{
    artifact::{PngSequenceWriter, VideoWriter},
    Sweep, SweepConfig,
};
use real2sim_py_env::{robot_control_mode, ManiSkillEnv, MediapyVideoWriter, PyPolicy};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => args.sweep_config()?,
    };
    if config.env.control_mode.is_empty() {
        config.env.control_mode = robot_control_mode(&config.env.robot)?;
    }
    if let Some(path) = &args.save_config {
        config.save(path)?;
        info!("Saved configuration to {:?}", path);
    }

    let sweep = Sweep::new(config)?;
    let config = sweep.config();
    let mut policy = PyPolicy::load(
        config.policy_model,
        &config.ckpt_path,
        config.action_scale,
        &config.runtime,
    )?;
    let mut writer: Box<dyn VideoWriter> = match args.png_frames {
        true => Box::new(PngSequenceWriter),
        false => Box::new(MediapyVideoWriter),
    };

    let report = sweep.run::<ManiSkillEnv, _>(&mut policy, writer.as_mut())?;
    if let Some(rate) = report.success_rate() {
        info!("Success rate of {}: {:.3}", config.env.env_name, rate);
    }

    Ok(())
}
