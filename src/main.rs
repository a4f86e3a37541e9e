use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::info;
use terminal_size::{terminal_size, Height, Width};

use softraster::colors::{self, Color};
use softraster::grid::Image;
use softraster::prelude::*;

const USAGE: &str = "\
Render one or many images of a 3D model (STL, OBJ or X3D) to PPM files or the console

softraster [options] file
 -o <file>        output file (- or -- for stdout, %04i in the name for many frames)
 -n <int>         number of frames (default: 1)
 -t <float>       timeout in seconds for console animation (0: just n frames)
 -w <int>         image width (default: 800)
 -h <int>         image height (default: width * 3/4)
 -d <float>       camera distance (default: fit the model)
 -yaw <float>     rotation around the vertical Z axis in degrees (default: 0)
 -tilt <float>    camera elevation in degrees (default: 20)
 -rz <float>      yaw increment per frame in degrees (default: 4)
 -rx <float>      tilt increment per frame in degrees (default: 0)
 -bgcolor r,g,b   background color, 0-255 per channel
 -xyz <file>      save the range image of the last frame as a point list
 --console        paint frames to a 24-bit color terminal, sized to the terminal
 --oldconsole     with --console, use the 256-color palette";

/// Terminal cells are about twice as tall as wide.
const CONSOLE_PIXEL_ASPECT: f32 = 0.5;
/// Console size when standard output is not a terminal.
const CONSOLE_FALLBACK: (usize, usize) = (120, 40);
/// Frame limit for a console animation bounded by `-t`.
const ANIMATION_FRAMES: usize = 1_000_000;
/// Clip planes as fractions of the camera distance.
const NEAR_RATIO: f32 = 0.05;
const FAR_RATIO: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Palette {
    TrueColor,
    Xterm256,
}

struct Args {
    input: PathBuf,
    output: Option<String>,
    frames: usize,
    /// Seconds; zero renders exactly `frames` frames.
    timeout: f64,
    width: usize,
    height: Option<usize>,
    distance: Option<f32>,
    yaw: f32,
    tilt: f32,
    yaw_step: f32,
    tilt_step: f32,
    background: Color,
    xyz: Option<PathBuf>,
    console: bool,
    palette: Palette,
}

fn value<'a>(flag: &str, it: &mut impl Iterator<Item = &'a String>) -> Result<&'a str> {
    it.next()
        .map(String::as_str)
        .with_context(|| format!("missing value for {flag}"))
}

fn number<T: std::str::FromStr>(flag: &str, it: &mut std::slice::Iter<String>) -> Result<T> {
    let v = value(flag, it)?;
    v.parse()
        .ok()
        .with_context(|| format!("invalid value for {flag}: {v}"))
}

fn parse_color(text: &str) -> Result<Color> {
    let channels: Vec<f32> = text
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid color {text}"))?;
    match channels[..] {
        [r, g, b] => Ok(Vec3::new(r, g, b) / 255.0),
        _ => bail!("color needs three channels: {text}"),
    }
}

impl Args {
    /// `None` when no input file was given.
    fn parse(argv: &[String]) -> Result<Option<Self>> {
        let mut args = Args {
            input: PathBuf::new(),
            output: None,
            frames: 1,
            timeout: 0.0,
            width: Renderer::DEFAULT_WIDTH,
            height: None,
            distance: None,
            yaw: 0.0,
            tilt: 20.0,
            yaw_step: 4.0,
            tilt_step: 0.0,
            background: colors::BLACK,
            xyz: None,
            console: false,
            palette: Palette::TrueColor,
        };
        let mut input = None;
        let mut it = argv.iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "-o" => args.output = Some(value(arg, &mut it)?.to_string()),
                "-n" => args.frames = number(arg, &mut it)?,
                "-t" => args.timeout = number(arg, &mut it)?,
                "-w" => args.width = number(arg, &mut it)?,
                "-h" => args.height = Some(number(arg, &mut it)?),
                "-d" => args.distance = Some(number(arg, &mut it)?),
                "-yaw" => args.yaw = number(arg, &mut it)?,
                "-tilt" => args.tilt = number(arg, &mut it)?,
                "-rz" => args.yaw_step = number(arg, &mut it)?,
                "-rx" => args.tilt_step = number(arg, &mut it)?,
                "-bgcolor" => args.background = parse_color(value(arg, &mut it)?)?,
                "-xyz" => args.xyz = Some(PathBuf::from(value(arg, &mut it)?)),
                "--console" | "-console" => args.console = true,
                "--oldconsole" | "-oldconsole" => args.palette = Palette::Xterm256,
                "--help" | "-help" => return Ok(None),
                flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option {flag}"),
                file => input = Some(PathBuf::from(file)),
            }
        }
        if !(args.timeout.is_finite() && args.timeout >= 0.0) {
            bail!("timeout must be a non-negative number of seconds");
        }
        Ok(input.map(|input| Args { input, ..args }))
    }

    fn height(&self) -> usize {
        self.height.unwrap_or(self.width * 3 / 4)
    }

    /// A console run with a timeout animates until time is up.
    fn frame_limit(&self) -> (usize, Option<Duration>) {
        if self.console && self.timeout > 0.0 {
            (ANIMATION_FRAMES, Some(Duration::from_secs_f64(self.timeout)))
        } else {
            (self.frames, None)
        }
    }
}

/// Output name for frame `i`; `%04i` / `%04d` is replaced by the frame number.
fn frame_name(pattern: &str, i: usize) -> String {
    let number = format!("{i:04}");
    pattern.replace("%04i", &number).replace("%04d", &number)
}

/// Terminal size in cells, leaving the last row for the cursor.
fn console_size() -> Option<(usize, usize)> {
    let (Width(w), Height(h)) = terminal_size()?;
    let rows = usize::from(h).saturating_sub(1);
    (w > 0 && rows > 0).then_some((usize::from(w), rows))
}

/// Channel levels of the xterm 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Nearest entry of the xterm 256-color palette, from the color cube (16-231)
/// or the gray ramp (232-255).
fn xterm256([r, g, b]: [u8; 3]) -> u8 {
    let dist = |c: [u8; 3]| -> u32 {
        [r, g, b]
            .iter()
            .zip(c)
            .map(|(&x, y)| (i32::from(x) - i32::from(y)).pow(2) as u32)
            .sum()
    };
    let nearest_level = |v: u8| -> usize {
        (0..CUBE_LEVELS.len())
            .min_by_key(|&i| (i32::from(CUBE_LEVELS[i]) - i32::from(v)).abs())
            .unwrap_or(0)
    };
    let (ri, gi, bi) = (nearest_level(r), nearest_level(g), nearest_level(b));
    let cube = (16 + 36 * ri + 6 * gi + bi) as u8;
    let cube_dist = dist([CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]]);

    // Gray ramp levels are 8, 18, ..., 238.
    let mean = (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
    let step = (mean.saturating_sub(3) / 10).min(23) as u8;
    let level = 8 + 10 * step;
    if dist([level; 3]) < cube_dist {
        232 + step
    } else {
        cube
    }
}

/// Paint the image with one space per pixel on a colored background.
fn console_paint(image: &Image, palette: Palette, out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "\x1b[H")?;
    for row in image.rows_iter() {
        for &c in row {
            let rgb = colors::to_rgb8(c);
            match palette {
                Palette::TrueColor => {
                    let [r, g, b] = rgb;
                    write!(out, "\x1b[48;2;{r};{g};{b}m ")?;
                }
                Palette::Xterm256 => write!(out, "\x1b[48;5;{}m ", xterm256(rgb))?,
            }
        }
        writeln!(out, "\x1b[0m")?;
    }
    out.flush()
}

fn update_projection(renderer: &mut Renderer, camera: &OrbitCamera, pixel_aspect: f32) {
    let aspect = renderer.aspect() * pixel_aspect;
    renderer.set_projection(camera.projection(
        aspect,
        camera.distance * NEAR_RATIO,
        camera.distance * FAR_RATIO,
    ));
}

fn run(args: Args) -> Result<()> {
    let t0 = Instant::now();
    let model = io::load_mesh(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    info!("load {} {:.3} s", args.input.display(), t0.elapsed().as_secs_f32());
    let loaded = Instant::now();

    let (width, height) = if args.console {
        console_size().unwrap_or(CONSOLE_FALLBACK)
    } else {
        (args.width, args.height())
    };
    let mut renderer = Renderer::new(width, height).context("invalid image size")?;
    let pixel_aspect = if args.console { CONSOLE_PIXEL_ASPECT } else { 1.0 };

    let mut scene = Scene::new();
    scene.ambient_light = 0.2;
    scene.add(model);

    let mut camera = OrbitCamera {
        yaw: args.yaw.to_radians(),
        tilt: args.tilt.to_radians(),
        ..OrbitCamera::default()
    };
    match args.distance {
        Some(d) => camera.distance = d,
        None => camera.fit_scene(&mut scene, renderer.aspect() * pixel_aspect),
    }

    renderer.set_background(args.background);
    renderer.set_light(Light::directional(Vec3::new(-0.3, 0.55, 1.0)));
    update_projection(&mut renderer, &camera, pixel_aspect);
    renderer.set_scene(scene);

    let (frames, timeout) = args.frame_limit();
    let output = match (&args.output, args.console) {
        (Some(o), _) => Some(o.clone()),
        (None, true) => None,
        (None, false) if frames == 1 => Some("out.ppm".to_string()),
        (None, false) => Some("out%04i.ppm".to_string()),
    };

    let start = Instant::now();
    let stdout = std::io::stdout();
    let mut rendered = 0usize;
    for i in 0..frames {
        if timeout.is_some_and(|t| loaded.elapsed() > t) {
            break;
        }
        camera.yaw = (args.yaw + args.yaw_step * i as f32).to_radians();
        camera.tilt = (args.tilt + args.tilt_step * i as f32).to_radians();
        renderer.set_view(camera.view());

        if args.console {
            // Follow terminal resizes.
            if let Some((w, h)) = console_size() {
                if (w, h) != (renderer.width(), renderer.height()) {
                    renderer.set_size(w, h)?;
                    update_projection(&mut renderer, &camera, pixel_aspect);
                    write!(stdout.lock(), "\x1b[2J")?;
                }
            }
        }
        renderer.render()?;
        rendered += 1;

        if args.console {
            console_paint(renderer.image(), args.palette, &mut stdout.lock())?;
        }
        if let Some(pattern) = &output {
            let name = if frames == 1 {
                pattern.clone()
            } else {
                frame_name(pattern, i)
            };
            io::save_ppm(renderer.image(), &name).with_context(|| format!("failed to save {name}"))?;
        }
    }
    let elapsed = start.elapsed().as_secs_f32();
    info!(
        "t = {elapsed:.3} s (t frame = {:.3} s, {rendered} frames)",
        elapsed / rendered.max(1) as f32
    );

    if let Some(path) = &args.xyz {
        io::save_xyz(renderer.range_image(), path, &Mat4::identity())
            .with_context(|| format!("failed to save {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    match Args::parse(&argv)? {
        Some(args) => run(args),
        None => {
            println!("{USAGE}");
            Ok(())
        }
    }
}
