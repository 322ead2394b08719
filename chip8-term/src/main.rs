// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

extern crate chip8;
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

mod looper;
mod pacer;
mod render;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chip8::{Chip8, Quirks};
use looper::Step;
use pacer::Pacer;
use render::RenderBuf;

error_chain! {
    foreign_links {
        Chip8(chip8::Error);
        Io(io::Error);
    }

    errors {
        InvalidKeyList(list: String) {
            description("invalid key list")
            display("invalid key list '{}', expected hex digits like 5,a,F", list)
        }
        InvalidNumber(option: &'static str, value: String) {
            description("invalid number")
            display("invalid value '{}' for --{}", value, option)
        }
    }
}

const FRAME_INTERVAL_MS: u64 = 16;

struct CommandArgs {
    rom_file_name: String,
    cycles_per_second: u32, // default: 500
    pixel_decay_time: f32,
    frames: Option<u64>,
    held_keys: Vec<usize>,
    quirks: Quirks,
    seed: Option<u64>,
    live: bool,
    headless: bool,
}

impl CommandArgs {
    fn parse() -> Result<CommandArgs> {
        use clap::{App, Arg};

        let matches = App::new("chip8-term")
            .about("Runs a CHIP-8 program and draws its screen in the terminal")
            .arg(
                Arg::with_name("ROM_FILE")
                    .help("rom file to load")
                    .required(true),
            )
            .arg(
                Arg::with_name("cycles per second")
                    .short("c")
                    .long("cycles-per-sec")
                    .value_name("cycles_per_second")
                    .help(
                        "How many Chip8 cycles should be executed per second. Values between \
                         500-1000 should be fine.",
                    )
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("pixel decay time")
                    .short("d")
                    .long("pixel-decay-time")
                    .value_name("pixel_decay_time")
                    .help("How many seconds takes for pixel from lit to non-lit")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("frames")
                    .short("n")
                    .long("frames")
                    .value_name("frames")
                    .help("Stop after this many 60 Hz frames")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("keys")
                    .short("k")
                    .long("keys")
                    .value_name("keys")
                    .help("Comma separated hex keys held down for the whole run, e.g. 5,a")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("seed")
                    .long("seed")
                    .value_name("seed")
                    .help("Seed for the random number generator")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("modern quirks")
                    .long("modern-quirks")
                    .help("Shift Vx in place and keep I unchanged on Fx55/Fx65"),
            )
            .arg(
                Arg::with_name("live")
                    .long("live")
                    .help("Redraw the screen every frame"),
            )
            .arg(
                Arg::with_name("headless")
                    .long("headless")
                    .help("Don't wait between frames, simulate 16ms per frame instead"),
            )
            .get_matches();

        let cycles_per_second =
            parse_number("cycles-per-sec", matches.value_of("cycles per second"))?.unwrap_or(500);

        let pixel_decay_time =
            parse_number("pixel-decay-time", matches.value_of("pixel decay time"))?.unwrap_or(0.1);

        let held_keys = match matches.value_of("keys") {
            Some(list) => parse_keys(list)?,
            None => Vec::new(),
        };

        let quirks = if matches.is_present("modern quirks") {
            Quirks::modern()
        } else {
            Quirks::default()
        };

        Ok(CommandArgs {
            rom_file_name: matches.value_of("ROM_FILE").unwrap_or_default().to_string(),
            cycles_per_second,
            pixel_decay_time,
            frames: parse_number("frames", matches.value_of("frames"))?,
            held_keys,
            quirks,
            seed: parse_number("seed", matches.value_of("seed"))?,
            live: matches.is_present("live"),
            headless: matches.is_present("headless"),
        })
    }
}

fn parse_number<T: FromStr>(option: &'static str, value: Option<&str>) -> Result<Option<T>> {
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ErrorKind::InvalidNumber(option, value.to_string()).into()),
        None => Ok(None),
    }
}

fn parse_keys(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(|key| {
            usize::from_str_radix(key.trim(), 16)
                .ok()
                .filter(|&index| index < 16)
                .ok_or_else(|| Error::from(ErrorKind::InvalidKeyList(list.to_string())))
        })
        .collect()
}

fn read_rom<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    use std::io::Read;

    let mut rom_file = File::open(path)?;
    let mut rom_buffer = Vec::new();
    rom_file.read_to_end(&mut rom_buffer)?;
    Ok(rom_buffer)
}

fn main() {
    use std::process::exit;

    env_logger::init();

    match do_run() {
        Ok(_) => exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.iter().skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            exit(1);
        }
    }
}

fn do_run() -> Result<()> {
    let args = CommandArgs::parse()?;
    let app = App::new(&args)?;
    app.run()
}

struct App<'a> {
    command_args: &'a CommandArgs,
    render_buf: RenderBuf,
    vm: Chip8,
    pacer: Pacer,
    frames_done: u64,
}

impl<'a> App<'a> {
    fn new(command_args: &'a CommandArgs) -> Result<App<'a>> {
        let rom_data = read_rom(&command_args.rom_file_name)
            .map_err(|e| {
                error!("unable to read {}: {}", command_args.rom_file_name, e);
                e
            })
            .chain_err(|| format!("can't read rom {}", command_args.rom_file_name))?;

        let mut vm = match command_args.seed {
            Some(seed) => Chip8::with_quirks_and_seed(command_args.quirks, seed),
            None => Chip8::with_quirks(command_args.quirks),
        };
        vm.load(&rom_data)?;
        for &key in &command_args.held_keys {
            vm.set_key(key, true)?;
        }

        info!(
            "running {} ({} bytes) at {} cycles/s",
            command_args.rom_file_name,
            rom_data.len(),
            command_args.cycles_per_second
        );

        Ok(App {
            command_args,
            render_buf: RenderBuf::new(command_args.pixel_decay_time),
            vm,
            pacer: Pacer::new(command_args.cycles_per_second),
            frames_done: 0,
        })
    }

    fn run(mut self) -> Result<()> {
        let frame_interval = Duration::from_millis(FRAME_INTERVAL_MS);
        let throttle = !self.command_args.headless;
        let mut last_frame = Instant::now();

        let result = looper::run_loop(frame_interval, throttle, || {
            let dt = if throttle {
                let now = Instant::now();
                let dt = now - last_frame;
                last_frame = now;
                dt
            } else {
                frame_interval
            };

            self.update(dt)?;
            if self.command_args.live {
                self.render_live()?;
            }

            self.frames_done += 1;
            match self.command_args.frames {
                Some(limit) if self.frames_done >= limit => Ok(Step::Done),
                _ => Ok(Step::Cont),
            }
        });

        if !self.command_args.live {
            print!("{}", self.vm.display());
        }
        info!("stopped after {} frames", self.frames_done);

        result
    }

    fn update(&mut self, dt: Duration) -> Result<()> {
        let budget = self.pacer.advance(dt);

        for _ in 0..budget.cycles {
            self.vm.step()?;
        }
        for _ in 0..budget.timer_ticks {
            self.vm.tick_timers();
        }

        self.render_buf.update(self.vm.display(), dt.as_secs_f32());

        Ok(())
    }

    fn render_live(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        // clear screen, cursor home
        write!(out, "\x1b[2J\x1b[H{}", self.render_buf.to_text())?;
        out.flush()?;
        Ok(())
    }
}
