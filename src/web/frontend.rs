//! Embedded HTML/CSS/JS frontend for the churnwatch dashboard.
//!
//! Compiled into the binary as a string constant. No external assets and no
//! CDN dependencies; charts are plain CSS bars filled from `/api/metrics`.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>churnwatch</title>
<style>
:root {
  --bg: #111827;
  --surface: #1f2937;
  --border: #374151;
  --text: #f9fafb;
  --gray: #9ca3af;
  --primary: #6366f1;
  --success: #10b981;
  --warning: #f59e0b;
  --danger: #ef4444;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); line-height: 1.5; }

.navbar {
  position: sticky; top: 0; padding: 16px 24px;
  background: var(--bg); border-bottom: 1px solid var(--border);
  transition: background 0.2s;
}
.navbar.scrolled { background: var(--surface); }
.navbar h1 { font-size: 20px; }

.app { max-width: 1100px; margin: 0 auto; padding: 24px; display: grid; gap: 24px; }
.panel { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; }
.panel h2 { font-size: 16px; margin-bottom: 12px; }

.stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; }
.stat-number { font-size: 32px; font-weight: 700; color: var(--primary); }
.stat-label { color: var(--gray); font-size: 13px; }

.charts { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; }
.bar-row { display: grid; grid-template-columns: 130px 1fr 48px; gap: 8px; align-items: center; font-size: 13px; margin: 4px 0; }
.bar { height: 12px; border-radius: 6px; background: var(--primary); }
.bar.low { background: var(--success); }
.bar.medium { background: var(--warning); }
.bar.high { background: var(--danger); }

form { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; }
label { display: grid; gap: 4px; font-size: 12px; color: var(--gray); }
input, select { padding: 6px 8px; border-radius: 6px; border: 1px solid var(--border); background: var(--bg); color: var(--text); }
button { grid-column: 1 / -1; padding: 10px; border: none; border-radius: 6px; background: var(--primary); color: white; font-weight: 600; cursor: pointer; }

#predictionResult { display: none; }
.result-card { text-align: center; }
.probability-circle span { font-size: 40px; font-weight: 700; }
.probability-low span { color: var(--success); }
.probability-medium span { color: var(--warning); }
.probability-high span { color: var(--danger); }
.prediction-badge { display: inline-block; margin: 8px 0; padding: 4px 12px; border-radius: 12px; font-size: 13px; }
.badge-success { background: rgba(16,185,129,0.2); color: var(--success); }
.badge-warning { background: rgba(245,158,11,0.2); color: var(--warning); }
.badge-danger { background: rgba(239,68,68,0.2); color: var(--danger); }
.retention-tips { text-align: left; margin-top: 16px; }
.retention-tips ul { padding-left: 20px; }
.result-card.error h3 { color: var(--danger); }
.text-muted { color: var(--gray); }
.loading { text-align: center; color: var(--gray); }
.spinner { width: 32px; height: 32px; margin: 0 auto 8px; border: 3px solid var(--border); border-top-color: var(--primary); border-radius: 50%; animation: spin 0.8s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
</style>
</head>
<body>
<nav class="navbar"><h1>churnwatch</h1></nav>
<main class="app">
  <section class="panel stats" id="stats"></section>

  <section class="charts">
    <div class="panel"><h2>Model Performance Metrics</h2><div id="performanceChart"></div></div>
    <div class="panel"><h2>Top Feature Importance</h2><div id="featureChart"></div></div>
    <div class="panel"><h2>Customer Risk Distribution</h2><div id="distributionChart"></div></div>
  </section>

  <section class="panel">
    <h2>Predict Churn</h2>
    <form id="predictForm">
      <label>Gender<select name="gender"><option>Male</option><option>Female</option></select></label>
      <label>Senior citizen<select name="senior_citizen"><option>No</option><option>Yes</option></select></label>
      <label>Partner<select name="partner"><option>No</option><option>Yes</option></select></label>
      <label>Dependents<select name="dependents"><option>No</option><option>Yes</option></select></label>
      <label>Tenure (months)<input name="tenure" type="number" min="0" value="12" required></label>
      <label>Phone service<select name="phone_service"><option>Yes</option><option>No</option></select></label>
      <label>Multiple lines<select name="multiple_lines"><option>No</option><option>Yes</option></select></label>
      <label>Internet service<select name="internet_service"><option>DSL</option><option>Fiber optic</option><option>No</option></select></label>
      <label>Online security<select name="online_security"><option>No</option><option>Yes</option></select></label>
      <label>Online backup<select name="online_backup"><option>No</option><option>Yes</option></select></label>
      <label>Device protection<select name="device_protection"><option>No</option><option>Yes</option></select></label>
      <label>Tech support<select name="tech_support"><option>No</option><option>Yes</option></select></label>
      <label>Streaming TV<select name="streaming_tv"><option>No</option><option>Yes</option></select></label>
      <label>Streaming movies<select name="streaming_movies"><option>No</option><option>Yes</option></select></label>
      <label>Contract<select name="contract"><option>Month-to-month</option><option>One year</option><option>Two year</option></select></label>
      <label>Paperless billing<select name="paperless_billing"><option>Yes</option><option>No</option></select></label>
      <label>Payment method<select name="payment_method"><option>Electronic check</option><option>Mailed check</option><option>Bank transfer</option><option>Credit card</option></select></label>
      <label>Monthly charges<input name="monthly_charges" type="number" step="0.01" value="70.00" required></label>
      <label>Total charges<input name="total_charges" type="number" step="0.01" value="840.00" required></label>
      <button type="submit">Predict</button>
    </form>
  </section>

  <section class="panel" id="predictionResult"></section>
</main>

<script>
const LOADING = '<div class="loading"><div class="spinner"></div><p>Analyzing customer data with AI...</p></div>';

function animateValue(el, end, duration, format) {
  let startTs = null;
  const step = (ts) => {
    if (startTs === null) startTs = ts;
    const progress = Math.min((ts - startTs) / duration, 1);
    el.textContent = format(Math.floor(progress * end));
    if (progress < 1) requestAnimationFrame(step);
  };
  requestAnimationFrame(step);
}

function statFormatter(target) {
  if (target.includes('%')) return (v) => v + '%';
  if (target.includes('$')) return (v) => '$' + v.toLocaleString();
  if (target.includes('x')) return (v) => (v / 10).toFixed(1) + 'x';
  return (v) => v.toLocaleString();
}

function bars(container, values, scale, tierClass) {
  container.innerHTML = values.map((m) => {
    const width = scale > 0 ? Math.min(m.value / scale, 1) * 100 : 0;
    const cls = tierClass ? ' ' + m.label.split(' ')[0].toLowerCase() : '';
    return '<div class="bar-row"><span>' + m.label + '</span><div class="bar' + cls +
      '" style="width:' + width + '%"></div><span>' + m.value + '</span></div>';
  }).join('');
}

async function loadMetrics() {
  const resp = await fetch('/api/metrics');
  const m = await resp.json();
  bars(document.getElementById('performanceChart'), m.performance, 1.0, false);
  const maxImportance = Math.max(...m.feature_importance.map((v) => v.value));
  bars(document.getElementById('featureChart'), m.feature_importance, maxImportance, false);
  const total = m.risk_distribution.reduce((a, v) => a + v.value, 0);
  bars(document.getElementById('distributionChart'), m.risk_distribution, total, true);

  const auc = m.performance.find((v) => v.label === 'ROC AUC');
  const low = m.risk_distribution.find((v) => v.label === 'Low Risk');
  const stats = [
    ['ROC AUC', auc ? Math.round(auc.value * 100) + '%' : '0%'],
    ['Low-risk customers', low ? Math.round(low.value) + '%' : '0%'],
    ['Features tracked', String(m.feature_importance.length)],
  ];
  const container = document.getElementById('stats');
  container.innerHTML = stats.map(([label, target]) =>
    '<div><div class="stat-number" data-target="' + target + '">0</div><div class="stat-label">' +
    label + '</div></div>').join('');

  document.querySelectorAll('.stat-number').forEach((el) => {
    const observer = new IntersectionObserver((entries) => {
      entries.forEach((entry) => {
        if (!entry.isIntersecting) return;
        const target = el.getAttribute('data-target');
        const number = parseFloat(target.replace(/[$,%x]/g, ''));
        const end = target.includes('x') ? number * 10 : number;
        animateValue(el, end, 2000, statFormatter(target));
        observer.unobserve(el);
      });
    });
    observer.observe(el);
  });
}

document.getElementById('predictForm').addEventListener('submit', async (e) => {
  e.preventDefault();
  const result = document.getElementById('predictionResult');
  result.innerHTML = LOADING;
  result.style.display = 'block';
  try {
    const resp = await fetch('/predict', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(Object.fromEntries(new FormData(e.target))),
    });
    result.innerHTML = await resp.text();
    const span = result.querySelector('.probability-circle span');
    if (span) {
      const end = parseFloat(span.textContent);
      animateValue(span, end, 1500, (v) => v + '%');
    }
  } catch (err) {
    result.innerHTML = '<div class="result-card error"><h3>Prediction Error</h3><p></p></div>';
    result.querySelector('p').textContent = err.message;
  }
});

window.addEventListener('scroll', () => {
  document.querySelector('.navbar').classList.toggle('scrolled', window.scrollY > 100);
});

loadMetrics();
</script>
</body>
</html>
"##;
